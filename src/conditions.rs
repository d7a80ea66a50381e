use std::f64::consts::PI;

use serde::Serialize;
use seismic_response::{
    point, sdof_response, Building, ComponentKind, Direction, Foundation, GroundMotion, Level,
    LumpedMasses, MassModel, NodalRecords, NodeId, Point, ResponseError, StructuralComponent,
};

/// Vertical distance between consecutive slabs in metres.
pub const STORY_HEIGHT: f64 = 3.0;
/// Plan dimensions `(x, y)` of every slab in metres.
pub const PLAN: (f64, f64) = (20.0, 12.0);
/// Sampling interval of the synthetic records in seconds.
pub const TIME_STEP: f64 = 0.0025;
/// Length of the synthetic records in seconds.
pub const DURATION: f64 = 8.0;

/// Parameters of the synthetic shear building and its ground shaking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShearBuildingProperties {
    /// Number of stories above the base.
    pub stories: u32,
    /// Number of basement levels.
    pub subs: u32,
    /// Soil-structure configuration.
    pub foundation: Foundation,
    /// First-mode period along `x` in seconds; `y` is 15 % softer.
    pub fundamental_period: f64,
    /// Modal damping ratio of the building.
    pub damping_ratio: f64,
    /// Amplitude of the east ground acceleration in m/s².
    pub ground_amplitude: f64,
    /// Period of the east ground acceleration in seconds.
    pub ground_period: f64,
    /// Share of the roof drift carried by rigid rocking of the foundation.
    pub rocking: f64,
    /// Extra sway of the slab edges relative to the slab center.
    pub torsion: f64,
}

impl ShearBuildingProperties {
    /// Properties of a building with `stories` levels above ground.
    ///
    /// The fundamental period follows the rule of thumb `T = 0.1 N` seconds.
    #[must_use]
    pub fn new(stories: u32, subs: u32, foundation: Foundation) -> Self {
        Self {
            stories,
            subs,
            foundation,
            fundamental_period: 0.1 * f64::from(stories.max(1)),
            damping_ratio: 0.05,
            ground_amplitude: 0.25 * 9.81,
            ground_period: 0.6,
            rocking: if foundation.is_compliant() { 0.1 } else { 0.0 },
            torsion: 0.1,
        }
    }
}

/// Records of one synthetic time-history run.
#[derive(Debug, Clone)]
pub struct SyntheticRun {
    /// Properties that generated the records, exposed for reporting.
    pub properties: ShearBuildingProperties,
    /// Level layout of the model.
    pub building: Building,
    /// Input acceleration at the base.
    pub ground: GroundMotion,
    /// Relative nodal displacements.
    pub displacements: NodalRecords,
    /// Absolute nodal accelerations.
    pub accelerations: NodalRecords,
    /// Base reactions, recorded only for fixed-base runs.
    pub reactions: Option<NodalRecords>,
    /// Seismic mass of every level.
    pub masses: LumpedMasses,
}

/// Slab and core quantities of a generic reinforced concrete building.
#[must_use]
pub fn default_mass_model(stories: u32, subs: u32) -> MassModel {
    let levels = (stories + subs + 1) as usize;
    let lowest = -(subs as Level);
    MassModel {
        components: vec![
            StructuralComponent {
                name: "slabs".to_string(),
                kind: ComponentKind::Slab,
                area: PLAN.0 * PLAN.1,
                density: 2.5,
                first_level: lowest,
                thickness: vec![0.2; levels],
            },
            StructuralComponent {
                name: "core".to_string(),
                kind: ComponentKind::Vertical,
                area: 24.0,
                density: 2.5,
                first_level: lowest + 1,
                thickness: vec![0.3; levels - 1],
            },
        ],
        ..MassModel::default()
    }
}

/// Corner coordinates of every level, four per slab.
fn corner_nodes(stories: u32, subs: u32) -> Vec<(NodeId, Point)> {
    let corners = [(0.0, 0.0), (0.0, PLAN.1), (PLAN.0, 0.0), (PLAN.0, PLAN.1)];
    (0..=stories + subs)
        .flat_map(|k| {
            let z = STORY_HEIGHT * (f64::from(k) - f64::from(subs));
            corners
                .into_iter()
                .enumerate()
                .map(move |(c, (x, y))| (NodeId(10 * (k + 1) + c as u32), point(x, y, z)))
        })
        .collect()
}

/// Harmonic ground acceleration under a half-sine envelope.
fn ground_motion(
    properties: &ShearBuildingProperties,
    samples: usize,
) -> Result<GroundMotion, ResponseError> {
    let wave = |amplitude: f64, period: f64| -> Vec<f64> {
        (0..samples)
            .map(|i| {
                let t = i as f64 * TIME_STEP;
                amplitude * (PI * t / DURATION).sin() * (2.0 * PI * t / period).sin()
            })
            .collect()
    };
    let amplitude = properties.ground_amplitude;
    GroundMotion::from_samples(
        wave(amplitude, properties.ground_period),
        wave(0.6 * amplitude, 1.3 * properties.ground_period),
        wave(0.3 * amplitude, 0.5 * properties.ground_period),
        TIME_STEP,
        1.0,
    )
}

/// First-mode relative displacement and acceleration of the roof-normalised mode.
fn modal_response(
    ground: &[f64],
    period: f64,
    damping_ratio: f64,
) -> Result<(Vec<f64>, Vec<f64>), ResponseError> {
    let response = sdof_response(ground, period, damping_ratio, TIME_STEP)?;
    let omega = 2.0 * PI / period;
    // Relative acceleration from the equation of motion.
    let acceleration = ground
        .iter()
        .zip(response.displacement.iter().zip(&response.velocity))
        .map(|(a_g, (u, v))| -a_g - 2.0 * damping_ratio * omega * v - omega * omega * u)
        .collect();
    Ok((response.displacement, acceleration))
}

/// Build a synthetic run of a uniform shear building swaying in its first mode.
///
/// The mode shape is linear over the stories above ground; basement levels move
/// with the ground. A compliant foundation adds a rigid rocking of the whole
/// superstructure, visible as vertical motion of the base corners.
pub fn synthesize(
    properties: ShearBuildingProperties,
    mass_model: &MassModel,
) -> Result<SyntheticRun, ResponseError> {
    let building = Building::from_coordinates(
        corner_nodes(properties.stories, properties.subs),
        properties.stories,
        properties.subs,
    )?
    .with_foundation(properties.foundation);
    let masses = mass_model.lumped(building.lowest(), building.roof())?;

    let samples = (DURATION / TIME_STEP).round() as usize;
    let ground = ground_motion(&properties, samples)?;

    let stories = f64::from(properties.stories.max(1));
    let participation = 3.0 * stories / (2.0 * stories + 1.0);
    let (u_x, a_x) = modal_response(
        ground.component(Direction::X).samples(),
        properties.fundamental_period,
        properties.damping_ratio,
    )?;
    let (u_y, a_y) = modal_response(
        ground.component(Direction::Y).samples(),
        1.15 * properties.fundamental_period,
        properties.damping_ratio,
    )?;
    let roof_height = STORY_HEIGHT * stories;
    let tilt: Vec<f64> = u_x
        .iter()
        .map(|u| properties.rocking * participation * u / roof_height)
        .collect();

    let (x_center, y_center) = (PLAN.0 / 2.0, PLAN.1 / 2.0);
    let mut displacements = NodalRecords::new(TIME_STEP)?;
    let mut relative = NodalRecords::new(TIME_STEP)?;
    for group in building.levels() {
        let shape = f64::from(group.level().max(0)) / stories * participation;
        for (&node, position) in group.nodes().iter().zip(group.positions()) {
            let twist_x = 1.0 + properties.torsion * (position.y - y_center) / y_center;
            let twist_y = 1.0 + properties.torsion * (position.x - x_center) / x_center;
            let sway = |response: &[f64], twist: f64| -> Vec<f64> {
                response.iter().map(|value| shape * twist * value).collect()
            };

            let mut x = sway(&u_x, twist_x);
            let mut z = vec![0.0; samples];
            if group.level() >= 0 {
                for ((dx, dz), theta) in x.iter_mut().zip(z.iter_mut()).zip(&tilt) {
                    *dx += theta * position.z;
                    if group.level() == 0 {
                        *dz = theta * (position.x - x_center);
                    }
                }
            }
            displacements.insert(node, [x, sway(&u_y, twist_y), z])?;
            relative.insert(
                node,
                [sway(&a_x, twist_x), sway(&a_y, twist_y), vec![0.0; samples]],
            )?;
        }
    }
    let accelerations = relative.with_ground_motion(&ground)?;

    let reactions = match properties.foundation {
        Foundation::FixedBase => Some(base_reactions(&building, &accelerations, &masses)?),
        Foundation::AbsorbingBoundaries | Foundation::Drm => None,
    };

    Ok(SyntheticRun {
        properties,
        building,
        ground,
        displacements,
        accelerations,
        reactions,
        masses,
    })
}

/// Support forces balancing the inertia of every level above the base, shared
/// evenly by the four base corners.
fn base_reactions(
    building: &Building,
    accelerations: &NodalRecords,
    masses: &LumpedMasses,
) -> Result<NodalRecords, ResponseError> {
    let samples = accelerations.samples();
    let mut totals = [vec![0.0; samples], vec![0.0; samples], vec![0.0; samples]];
    for group in building.levels().iter().filter(|group| group.level() > 0) {
        let mass = masses.mass(group.level())?;
        for direction in Direction::ALL {
            for &node in group.nodes() {
                let record = accelerations.series(node, direction)?;
                for (total, value) in totals[direction.index()].iter_mut().zip(record) {
                    *total += mass * value / 4.0;
                }
            }
        }
    }

    let share = totals.map(|total| total.into_iter().map(|value| value / 4.0).collect::<Vec<_>>());
    let mut reactions = NodalRecords::new(accelerations.time_step())?;
    for &node in building.level(0)?.nodes() {
        reactions.insert(node, share.clone())?;
    }
    Ok(reactions)
}
