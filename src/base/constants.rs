/// Defines the directory where the simulation result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/lakesim/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/lakesim/test";

/// Number of seconds in one year (used to name the result directories)
pub const SECONDS_PER_YEAR: f64 = 3.154e7;

/// Defines the smallest allowed tolerance (Config)
pub const CONFIG_MIN_TOL: f64 = 1e-15;

/// Normal stress (Pa) below which the bed reaction is considered tensile (ice lift-off)
pub const CONTACT_TENSION_TOL: f64 = 1.0;
