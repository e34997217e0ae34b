//! Makes available common structures needed to run a simulation
//!
//! You may write `use lakesim::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{BedProfile, BoundaryMarkers, Config, Dof, Essential, IceMesh, Tag, WallBcs};
pub use crate::base::{DEFAULT_OUT_DIR, SECONDS_PER_YEAR};
pub use crate::fem::{ResultSeries, Simulation, SimulationState, SolverStokes, TimeStepper};
