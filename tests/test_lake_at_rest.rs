use lakesim::{prelude::*, StrError};
use russell_lab::approx_eq;
use std::fs;

#[test]
fn test_lake_at_rest() -> Result<(), StrError> {
    // A lake without water supply under a flat ice surface is in equilibrium:
    // the water pressure at the roof balances the weight of the ice column.
    // Thus, one time step must barely change the geometry.

    // configuration (Newtonian ice to make the test fast)
    let mut config = Config::new();
    config.volume_amplitude = 0.0;
    config.set_resolution(41, 4)?.set_rheology(1.0, 5e-14)?;
    config.set_period(SECONDS_PER_YEAR, SECONDS_PER_YEAR / 200.0)?;
    config.set_verbose(false, false);

    // run simulation
    let sim = Simulation::new(&config, Some("/tmp/lakesim/test/lake_at_rest"))?;
    let results = sim.run()?;

    // shapes
    assert_eq!(results.nx(), 41);
    assert_eq!(results.nt(), 2);
    assert_eq!(results.check(), Ok(()));
    approx_eq(results.tt[1], config.dt(), 1e-6);

    // initial grounding lines enclose the columns where the ice floats
    let bed = BedProfile::from_config(&config);
    let xx = config.columns();
    let floating: Vec<_> = xx
        .iter()
        .filter(|x| bed.interface(**x) - bed.bed(**x) > config.tol)
        .copied()
        .collect();
    assert_eq!(results.x_left[0], floating[0]);
    assert_eq!(results.x_right[0], floating[floating.len() - 1]);

    // equilibrium
    for i in 0..results.nx() {
        assert!(f64::abs(results.lower[1][i] - results.lower[0][i]) < 0.1);
        assert!(f64::abs(results.upper[1][i] - results.upper[0][i]) < 0.1);
        assert!(results.lower[1][i] >= bed.bed(xx[i]));
    }
    assert!(f64::abs(results.lake_vol[1] - results.lake_vol[0]) < 1e-3 * results.lake_vol[0]);

    // files
    let path = sim.results_path();
    for name in ["Gamma_s", "Gamma_h", "x_left", "x_right", "X", "t", "lake_vol", "summary.json"] {
        assert!(fs::metadata(path.join(name)).is_ok());
    }
    let read = ResultSeries::read(&path)?;
    assert_eq!(read.nx(), 41);
    assert_eq!(read.nt(), 2);
    Ok(())
}
