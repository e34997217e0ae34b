use super::{ResultSeries, SimulationState, TimeStepper};
use crate::base::{Config, DEFAULT_OUT_DIR};
use crate::StrError;
use std::path::{Path, PathBuf};

/// Runs a complete simulation and writes its results
///
/// The output directory receives a subdirectory named after the configuration
/// (see [Config::results_dir_name]) containing the result arrays, the configuration
/// (`summary.json`), and the last state (`state.json`).
pub struct Simulation<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// Output directory
    pub out_dir: String,
}

impl<'a> Simulation<'a> {
    /// Allocates a new instance
    ///
    /// Uses [DEFAULT_OUT_DIR] if `out_dir` is None.
    pub fn new(config: &'a Config, out_dir: Option<&str>) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate simulation because config.validate() failed");
        }
        Ok(Simulation {
            config,
            out_dir: out_dir.unwrap_or(DEFAULT_OUT_DIR).to_string(),
        })
    }

    /// Returns the path of the results directory
    pub fn results_path(&self) -> PathBuf {
        Path::new(&self.out_dir).join(self.config.results_dir_name())
    }

    /// Returns the path of the summary (configuration) file
    pub fn path_summary(&self) -> PathBuf {
        self.results_path().join("summary.json")
    }

    /// Returns the path of the state file
    pub fn path_state(&self) -> PathBuf {
        self.results_path().join("state.json")
    }

    /// Runs the simulation from the initial geometry until t_final
    ///
    /// The results accumulated so far are written even if the time loop fails.
    pub fn run(&self) -> Result<ResultSeries, StrError> {
        let mut state = SimulationState::new(self.config)?;
        let mut results = ResultSeries::new(&self.config.columns());
        results.push(&state)?;
        let config = self.config;
        let path_results = self.results_path();
        let path_state = self.path_state();
        let path_summary = self.path_summary();

        // helper macro to save the results before returning an error
        macro_rules! run {
            ($e:expr) => {
                match $e {
                    Ok(val) => val,
                    Err(err) => {
                        match results.write(&path_results) {
                            Ok(_) => (),
                            Err(e) => println!("ERROR-ON-ERROR: cannot write results due to: {}", e),
                        }
                        match state.write_json(&path_state) {
                            Ok(_) => (),
                            Err(e) => println!("ERROR-ON-ERROR: cannot write state due to: {}", e),
                        }
                        match config.write_json(&path_summary) {
                            Ok(_) => (),
                            Err(e) => println!("ERROR-ON-ERROR: cannot write summary due to: {}", e),
                        }
                        return Err(err);
                    }
                }
            };
        }

        let mut stepper = run!(TimeStepper::new(config, &state));
        run!(stepper.run(&mut state, &mut results));

        results.write(&path_results)?;
        state.write_json(&path_state)?;
        config.write_json(&path_summary)?;
        Ok(results)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
