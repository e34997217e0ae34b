use super::{WallBcs, CONFIG_MIN_TOL, SECONDS_PER_YEAR};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the physical parameters and the numerical controls of a simulation
///
/// The configuration is explicitly constructed and then passed (by reference)
/// to every component; it is never modified during a run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Length of the domain L (m)
    pub length: f64,

    /// Nominal ice thickness H (m)
    pub thickness: f64,

    /// Minimal water depth distinguishing ice-bed from ice-water contact (m)
    ///
    /// Also used to localize the left and right walls.
    pub tol: f64,

    /// Depth of the bed depression (m)
    pub bed_depth: f64,

    /// Width of the bed depression (m)
    pub bed_width: f64,

    /// Far-field bed elevation (m)
    pub bed_offset: f64,

    /// Period of the water-volume forcing (s)
    pub t_period: f64,

    /// Final simulation time (s)
    pub t_final: f64,

    /// Number of time steps per forcing period
    pub n_steps_per_period: usize,

    /// Amplitude of the lake volume oscillation ΔV (m² per unit width)
    pub volume_amplitude: f64,

    /// Basal friction coefficient C (Pa·s/m)
    pub friction: f64,

    /// Number of columns (mesh points along x)
    pub nx: usize,

    /// Number of layers (cells along z)
    pub nz: usize,

    /// Density of ice (kg/m³)
    pub rho_ice: f64,

    /// Density of water (kg/m³)
    pub rho_water: f64,

    /// Gravity acceleration (m/s²)
    pub gravity: f64,

    /// Glen's law exponent n
    pub glen_n: f64,

    /// Glen's law rate factor A (Pa⁻ⁿ s⁻¹)
    pub rate_factor: f64,

    /// Regularization of the squared effective strain rate (s⁻²)
    pub strain_rate_reg: f64,

    /// Coefficient α of the pressure stabilization term
    pub stabilization: f64,

    /// Penalty coefficient enforcing no-penetration on the bed (Pa·s/m)
    pub bed_penalty: f64,

    /// Boundary condition at the left and right walls
    pub wall_bcs: WallBcs,

    /// Maximum number of Picard iterations
    pub n_max_iterations: usize,

    /// Relative tolerance for the Picard iterations
    pub tol_rel_picard: f64,

    /// Absolute tolerance for the Picard iterations (m/s)
    pub tol_abs_picard: f64,

    /// Verbose mode during timesteps
    pub verbose_timesteps: bool,

    /// Verbose mode during iterations
    pub verbose_iterations: bool,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        Config {
            length: 40.0e3,
            thickness: 1.0e3,
            tol: 1.0e-3,
            bed_depth: 8.0,
            bed_width: 8.0e3,
            bed_offset: 4.0,
            t_period: SECONDS_PER_YEAR,
            t_final: SECONDS_PER_YEAR,
            n_steps_per_period: 200,
            volume_amplitude: 1.0e5,
            friction: 1.0e9,
            nx: 201,
            nz: 10,
            rho_ice: 917.0,
            rho_water: 1000.0,
            gravity: 9.81,
            glen_n: 3.0,
            rate_factor: 2.24e-24,
            strain_rate_reg: 1.0e-24,
            stabilization: 0.1,
            bed_penalty: 1.0e16,
            wall_bcs: WallBcs::Dirichlet,
            n_max_iterations: 100,
            tol_rel_picard: 1.0e-4,
            tol_abs_picard: 1.0e-14,
            verbose_timesteps: true,
            verbose_iterations: false,
        }
    }

    /// Sets the wall boundary condition mode from a string ("dirichlet" or "neumann")
    pub fn set_wall_bcs(&mut self, mode: &str) -> Result<&mut Self, StrError> {
        self.wall_bcs = mode.parse()?;
        Ok(self)
    }

    /// Sets the mesh resolution
    pub fn set_resolution(&mut self, nx: usize, nz: usize) -> Result<&mut Self, StrError> {
        if nx < 2 {
            return Err("nx must be ≥ 2");
        }
        if nz < 1 {
            return Err("nz must be ≥ 1");
        }
        self.nx = nx;
        self.nz = nz;
        Ok(self)
    }

    /// Sets the forcing period and the final time (both in seconds)
    pub fn set_period(&mut self, t_period: f64, t_final: f64) -> Result<&mut Self, StrError> {
        if t_period <= 0.0 {
            return Err("t_period must be > 0.0");
        }
        if t_final < 0.0 {
            return Err("t_final must be ≥ 0.0");
        }
        self.t_period = t_period;
        self.t_final = t_final;
        Ok(self)
    }

    /// Sets Glen's law parameters
    pub fn set_rheology(&mut self, glen_n: f64, rate_factor: f64) -> Result<&mut Self, StrError> {
        if glen_n < 1.0 {
            return Err("glen_n must be ≥ 1.0");
        }
        if rate_factor <= 0.0 {
            return Err("rate_factor must be > 0.0");
        }
        self.glen_n = glen_n;
        self.rate_factor = rate_factor;
        Ok(self)
    }

    /// Sets the verbose flags
    pub fn set_verbose(&mut self, timesteps: bool, iterations: bool) -> &mut Self {
        self.verbose_timesteps = timesteps;
        self.verbose_iterations = iterations;
        self
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.length <= 0.0 {
            return Some(format!("length = {:?} is incorrect; it must be > 0.0", self.length));
        }
        if self.thickness <= 0.0 {
            return Some(format!("thickness = {:?} is incorrect; it must be > 0.0", self.thickness));
        }
        if self.tol <= 0.0 {
            return Some(format!("tol = {:?} is incorrect; it must be > 0.0", self.tol));
        }
        if self.bed_depth < 0.0 {
            return Some(format!("bed_depth = {:?} is incorrect; it must be ≥ 0.0", self.bed_depth));
        }
        if self.bed_width <= 0.0 {
            return Some(format!("bed_width = {:?} is incorrect; it must be > 0.0", self.bed_width));
        }
        if self.t_period <= 0.0 {
            return Some(format!("t_period = {:?} is incorrect; it must be > 0.0", self.t_period));
        }
        if self.t_final < 0.0 {
            return Some(format!("t_final = {:?} is incorrect; it must be ≥ 0.0", self.t_final));
        }
        if self.n_steps_per_period < 1 {
            return Some(format!(
                "n_steps_per_period = {:?} is incorrect; it must be ≥ 1",
                self.n_steps_per_period
            ));
        }
        if self.friction <= 0.0 {
            return Some(format!("friction = {:?} is incorrect; it must be > 0.0", self.friction));
        }
        if self.nx < 2 {
            return Some(format!("nx = {:?} is incorrect; it must be ≥ 2", self.nx));
        }
        if self.nz < 1 {
            return Some(format!("nz = {:?} is incorrect; it must be ≥ 1", self.nz));
        }
        if self.rho_ice <= 0.0 || self.rho_water <= 0.0 {
            return Some(format!(
                "rho_ice = {:?} and rho_water = {:?} are incorrect; they must be > 0.0",
                self.rho_ice, self.rho_water
            ));
        }
        if self.gravity < 0.0 {
            return Some(format!("gravity = {:?} is incorrect; it must be ≥ 0.0", self.gravity));
        }
        if self.glen_n < 1.0 {
            return Some(format!("glen_n = {:?} is incorrect; it must be ≥ 1.0", self.glen_n));
        }
        if self.rate_factor <= 0.0 {
            return Some(format!("rate_factor = {:?} is incorrect; it must be > 0.0", self.rate_factor));
        }
        if self.strain_rate_reg <= 0.0 {
            return Some(format!(
                "strain_rate_reg = {:?} is incorrect; it must be > 0.0",
                self.strain_rate_reg
            ));
        }
        if self.stabilization <= 0.0 {
            return Some(format!(
                "stabilization = {:?} is incorrect; it must be > 0.0",
                self.stabilization
            ));
        }
        if self.bed_penalty <= 0.0 {
            return Some(format!("bed_penalty = {:?} is incorrect; it must be > 0.0", self.bed_penalty));
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if self.tol_rel_picard < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_rel_picard = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_rel_picard, CONFIG_MIN_TOL
            ));
        }
        if self.tol_abs_picard < 0.0 {
            return Some(format!(
                "tol_abs_picard = {:?} is incorrect; it must be ≥ 0.0",
                self.tol_abs_picard
            ));
        }
        None // all good
    }

    /// Returns the (fixed) time increment Δt
    pub fn dt(&self) -> f64 {
        self.t_period / (self.n_steps_per_period as f64)
    }

    /// Returns the water inflow rate Q(t) = dV/dt (m²/s per unit width)
    ///
    /// The lake volume follows `V(t) = V₀ + ΔV sin(2π t / T)`.
    pub fn inflow_rate(&self, t: f64) -> f64 {
        let omega = 2.0 * std::f64::consts::PI / self.t_period;
        self.volume_amplitude * omega * f64::cos(omega * t)
    }

    /// Returns the abscissae of the mesh columns
    pub fn columns(&self) -> Vec<f64> {
        let dx = self.length / ((self.nx - 1) as f64);
        (0..self.nx).map(|i| (i as f64) * dx).collect()
    }

    /// Returns the name of the results directory
    ///
    /// The name encodes the forcing period (years), the ice thickness (km),
    /// and the order of magnitude of the friction coefficient.
    pub fn results_dir_name(&self) -> String {
        format!(
            "results_t{:.1}_H{:.1}_C{}",
            self.t_period / SECONDS_PER_YEAR,
            self.thickness / 1000.0,
            f64::floor(f64::log10(self.friction)) as i64
        )
    }

    /// Reads a JSON file containing the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(file);
        let config = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(config)
    }

    /// Writes a JSON file with the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n")?;
        write!(f, "==================\n")?;
        write!(f, "length = {:?}\n", self.length)?;
        write!(f, "thickness = {:?}\n", self.thickness)?;
        write!(f, "tol = {:?}\n", self.tol)?;
        write!(f, "bed = (depth: {:?}, width: {:?}, offset: {:?})\n", self.bed_depth, self.bed_width, self.bed_offset)?;
        write!(f, "t_period = {:?}\n", self.t_period)?;
        write!(f, "t_final = {:?}\n", self.t_final)?;
        write!(f, "dt = {:?}\n", self.dt())?;
        write!(f, "volume_amplitude = {:?}\n", self.volume_amplitude)?;
        write!(f, "friction = {:?}\n", self.friction)?;
        write!(f, "mesh = {} × {}\n", self.nx, self.nz)?;
        write!(f, "glen = (n: {:?}, A: {:?})\n", self.glen_n, self.rate_factor)?;
        write!(f, "wall_bcs = {}\n", self.wall_bcs)?;
        write!(f, "picard = (n_max: {}, tol_rel: {:?})\n", self.n_max_iterations, self.tol_rel_picard)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
