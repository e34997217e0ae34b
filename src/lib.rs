//! Lakesim -- subglacial lake simulator
//!
//! Simulates a 2D ice slab flowing viscously (Glen's law Stokes flow) above a subglacial
//! lake whose volume is driven by a periodic water supply. The ice-water and ice-bed
//! interfaces move with the flow; the boundaries of the mesh are classified again at
//! every time step so the grounding lines can migrate.
//!
//! The main structures are:
//!
//! * [base::Config] -- holds all physical and numerical parameters
//! * [base::BedProfile] -- bed topography and initial ice-water interface
//! * [base::BoundaryMarkers] -- classification of boundary facets (left, right, bed, water)
//! * [base::Essential] -- wall constraints (dirichlet or neumann)
//! * [fem::SolverStokes] -- nonlinear (Picard) Stokes solver
//! * [fem::TimeStepper] -- advances the velocity, pressure, and geometry
//! * [fem::ResultSeries] -- time series of surfaces, grounding lines, and lake volume

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod fem;
pub mod prelude;
