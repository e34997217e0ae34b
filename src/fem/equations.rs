use crate::base::Dof;
use gemlab::mesh::PointId;

/// Number of DOFs per point (ux, uz, p)
pub const NDOF_PER_POINT: usize = 3;

/// Holds the equation numbers of the mixed velocity-pressure problem
///
/// Every point carries `(ux, uz, p)`; the last equation corresponds to the
/// lake pressure multiplier λ that enforces the water-volume constraint.
#[derive(Clone, Copy, Debug)]
pub struct Equations {
    /// Number of points
    pub npoint: usize,

    /// Total number of equations
    pub n_equation: usize,
}

impl Equations {
    /// Allocates a new instance
    pub fn new(npoint: usize) -> Self {
        Equations {
            npoint,
            n_equation: NDOF_PER_POINT * npoint + 1,
        }
    }

    /// Returns the equation number corresponding to (PointId, Dof)
    #[inline]
    pub fn eq(&self, point_id: PointId, dof: Dof) -> usize {
        NDOF_PER_POINT * point_id + (dof as usize)
    }

    /// Returns the equation number of the lake pressure multiplier
    #[inline]
    pub fn lambda(&self) -> usize {
        NDOF_PER_POINT * self.npoint
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
