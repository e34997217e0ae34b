use super::{cryostatic_pressure, grounding_lines, lake_volume, Equations, NDOF_PER_POINT};
use crate::base::{BedProfile, Config, Dof};
use crate::StrError;
use gemlab::mesh::PointId;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the state of a simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationState {
    /// Time
    pub t: f64,

    /// Delta time of the last step
    pub dt: f64,

    /// Number of accepted time steps
    pub timestep: usize,

    /// Velocity, deviatoric pressure, and lake multiplier {U}
    ///
    /// (n_equation)
    pub uu: Vector,

    /// Elevation of the lower surface (ice-bed or ice-water)
    ///
    /// (nx)
    pub lower: Vec<f64>,

    /// Elevation of the upper surface (ice-air)
    ///
    /// (nx)
    pub upper: Vec<f64>,

    /// Left grounding line position
    pub x_left: f64,

    /// Right grounding line position
    pub x_right: f64,

    /// Lake volume (area per unit width)
    pub lake_vol: f64,
}

impl SimulationState {
    /// Allocates a new instance with the initial geometry
    ///
    /// The lower surface follows the initial interface `max(0, bed)` and the upper surface is flat at H.
    pub fn new(config: &Config) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate state because config.validate() failed");
        }
        let bed = BedProfile::from_config(config);
        let xx = config.columns();
        let npoint = config.nx * (config.nz + 1);
        let mut state = SimulationState {
            t: 0.0,
            dt: config.dt(),
            timestep: 0,
            uu: Vector::new(Equations::new(npoint).n_equation),
            lower: bed.interface_vec(&xx),
            upper: vec![config.thickness; config.nx],
            x_left: 0.0,
            x_right: 0.0,
            lake_vol: 0.0,
        };
        state.update_lake(config, &xx, &bed.bed_vec(&xx));
        Ok(state)
    }

    /// Updates the grounding lines and the lake volume from the lower surface
    pub fn update_lake(&mut self, config: &Config, xx: &[f64], bed: &[f64]) {
        let (x_left, x_right) = grounding_lines(xx, &self.lower, bed, config.tol, config.length);
        self.x_left = x_left;
        self.x_right = x_right;
        self.lake_vol = lake_volume(xx, &self.lower, bed);
    }

    /// Returns the total pressure at a point given its elevation
    pub fn pressure(&self, config: &Config, point_id: PointId, z: f64) -> f64 {
        let equations = Equations::new((self.uu.dim() - 1) / NDOF_PER_POINT);
        self.uu[equations.eq(point_id, Dof::P)] + cryostatic_pressure(config, z)
    }

    /// Returns the lake pressure correction λ
    pub fn lambda(&self) -> f64 {
        self.uu[self.uu.dim() - 1]
    }

    /// Reads a JSON file containing the state data
    ///
    /// The dimension of {U} and the lengths of the surfaces are checked.
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let state: SimulationState = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        let dim = state.uu.dim();
        if dim < 1 || (dim - 1) % NDOF_PER_POINT != 0 {
            return Err("the solution vector of the state has an incorrect dimension");
        }
        if state.lower.len() != state.upper.len() {
            return Err("the surfaces of the state must have the same length");
        }
        Ok(state)
    }

    /// Writes a JSON file with the state data
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
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
