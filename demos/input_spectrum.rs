use seismic_response::{Direction, GroundMotion, PeriodGrid, ResponseSpectrum, TimeSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two seconds of a 0.3 g pulse train sampled at 200 Hz.
    let east: Vec<f64> = (0..400)
        .map(|i| 0.3 * (2.0 * std::f64::consts::PI * f64::from(i) * 0.005 / 0.4).sin())
        .collect();
    let north = east.iter().map(|a| 0.5 * a).collect();
    let ground = GroundMotion::from_samples(east, north, vec![0.0; 400], 0.005, 9.81)?;

    let grid = PeriodGrid::linspace(0.05, 2.0, 40)?;
    let [x, y, _] = ground.spectra(&grid, 0.05)?;
    for ((period, sa_x), sa_y) in x.pairs().zip(y.values()) {
        println!("T = {period:.3} s  Sa_x = {sa_x:8.3} m/s²  Sa_y = {sa_y:8.3} m/s²");
    }

    // Decimating before the spectrum trades accuracy at short periods for speed.
    let raw = TimeSeries::new(ground.component(Direction::X).samples().to_vec(), 0.005)?;
    let spectrum = ResponseSpectrum::of(&raw.decimate(4)?, &grid, 0.05)?;
    if let Some((period, value)) = spectrum.peak() {
        println!("decimated peak: Sa = {value:.3} m/s² at T = {period:.3} s");
    }

    Ok(())
}
