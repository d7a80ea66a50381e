use seismic_response::{point, Building, Direction, DriftAggregator, Foundation, NodalRecords, NodeId};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three stories of 3.5 m on a 6 m by 6 m plan.
    let corners = [(0.0, 0.0), (0.0, 6.0), (6.0, 0.0), (6.0, 6.0)];
    let mut nodes = Vec::new();
    for k in 0..4_u32 {
        for (c, (x, y)) in (0_u32..).zip(corners) {
            nodes.push((NodeId(10 * k + c), point(x, y, 3.5 * f64::from(k))));
        }
    }
    let building = Building::from_coordinates(nodes, 3, 0)?.with_foundation(Foundation::FixedBase);

    // Sway grows linearly with height; the east edge moves 20 % more.
    let mut displacements = NodalRecords::new(0.01)?;
    for group in building.levels() {
        let scale = 0.01 * f64::from(group.level());
        for (&node, position) in group.nodes().iter().zip(group.positions()) {
            let twist = 1.0 + 0.2 * position.x / 6.0;
            let sway = (0..500)
                .map(|i| scale * twist * (f64::from(i) * 0.02).sin())
                .collect();
            displacements.insert(node, [sway, vec![0.0; 500], vec![0.0; 500]])?;
        }
    }

    let aggregator = DriftAggregator::new(&building, &displacements)?;
    for story in aggregator.drift_profile(Direction::X)?.stories {
        println!(
            "story {} -> {}: center = {:.4}, corner = {:.4}",
            story.lower, story.upper, story.center, story.corner
        );
    }
    let roof = aggregator.roof_drift(Direction::X)?;
    println!("roof drift: {:.4}", roof.center);

    Ok(())
}
