//! Implements the finite element solver and the time stepping

mod boundary_terms;
mod control_convergence;
mod element_stokes;
mod equations;
mod linear_system;
mod results;
mod simulation;
mod solver_stokes;
mod state;
mod surfaces;
mod time_stepper;
pub use crate::fem::boundary_terms::*;
pub use crate::fem::control_convergence::*;
pub use crate::fem::element_stokes::*;
pub use crate::fem::equations::*;
pub use crate::fem::linear_system::*;
pub use crate::fem::results::*;
pub use crate::fem::simulation::*;
pub use crate::fem::solver_stokes::*;
pub use crate::fem::state::*;
pub use crate::fem::surfaces::*;
pub use crate::fem::time_stepper::*;
