//! Implements the base structures for a subglacial lake simulation

mod config;
mod constants;
mod enums;
mod essential;
mod geometry;
mod ice_mesh;
mod markers;
mod rheology;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::enums::*;
pub use crate::base::essential::*;
pub use crate::base::geometry::*;
pub use crate::base::ice_mesh::*;
pub use crate::base::markers::*;
pub use crate::base::rheology::*;
