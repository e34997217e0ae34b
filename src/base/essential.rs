use super::{BoundaryMarkers, Dof, IceMesh, Tag, WallBcs};
use crate::StrError;
use gemlab::mesh::PointId;
use std::collections::BTreeMap;
use std::fmt;

/// Defines a constraint on one DOF over all facets with a given tag
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraint {
    /// Tag of the constrained facets
    pub tag: Tag,

    /// Constrained DOF
    pub dof: Dof,

    /// Prescribed value
    pub value: f64,
}

/// Holds the essential (Dirichlet) boundary conditions at the left and right walls
///
/// Only the horizontal velocity at the walls is handled here; the bed and water
/// boundaries are treated by the contact/friction and water-pressure terms of the solver.
#[derive(Clone, Debug)]
pub struct Essential {
    /// Wall boundary condition mode
    pub wall_bcs: WallBcs,

    /// All constraints
    pub all: Vec<Constraint>,
}

impl Essential {
    /// Allocates a new instance
    ///
    /// * `Dirichlet` -- zero horizontal velocity at the left and right walls
    /// * `Neumann` -- no constraints (free-slip walls)
    pub fn new(wall_bcs: WallBcs) -> Self {
        let all = match wall_bcs {
            WallBcs::Dirichlet => vec![
                Constraint {
                    tag: Tag::Left,
                    dof: Dof::Ux,
                    value: 0.0,
                },
                Constraint {
                    tag: Tag::Right,
                    dof: Dof::Ux,
                    value: 0.0,
                },
            ],
            WallBcs::Neumann => Vec::new(),
        };
        Essential { wall_bcs, all }
    }

    /// Allocates a new instance given the mode as a string ("dirichlet" or "neumann")
    pub fn from_mode(mode: &str) -> Result<Self, StrError> {
        Ok(Essential::new(mode.parse()?))
    }

    /// Expands the constraints into (PointId, Dof) → value pairs for the current markers
    ///
    /// A point shared by two constrained facets appears only once.
    pub fn prescribed(&self, ice_mesh: &IceMesh, markers: &BoundaryMarkers) -> BTreeMap<(PointId, Dof), f64> {
        let mut values = BTreeMap::new();
        for constraint in &self.all {
            for point_id in markers.points_with(constraint.tag, ice_mesh) {
                values.insert((point_id, constraint.dof), constraint.value);
            }
        }
        values
    }
}

impl fmt::Display for Essential {
    /// Prints a formatted summary of the wall boundary conditions
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Essential boundary conditions ({})\n", self.wall_bcs)?;
        write!(f, "==========================================\n")?;
        for c in &self.all {
            write!(f, "{:?} : {:?} = {:?}\n", c.tag, c.dof, c.value)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
