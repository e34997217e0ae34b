use super::{Equations, NEQ_LOCAL_FACET};
use crate::base::{Config, Dof, Facet, IceMesh};
use gemlab::mesh::PointId;
use russell_lab::Vector;

/// Calculates the water pressure at elevation z
///
/// The lake is in hydrostatic balance with the ice overburden at `z = 0`:
///
/// ```text
/// p_w(z) = ρ_i g H - ρ_w g z
/// ```
pub fn water_pressure(config: &Config, z: f64) -> f64 {
    config.rho_ice * config.gravity * config.thickness - config.rho_water * config.gravity * z
}

/// Calculates the cryostatic (ice overburden) pressure at elevation z
///
/// ```text
/// p_c(z) = ρ_i g (H - z)
/// ```
///
/// The solver works with the deviation `p - p_c` from this reference; thus, gravity
/// is balanced exactly and only boundary loads remain.
pub fn cryostatic_pressure(config: &Config, z: f64) -> f64 {
    config.rho_ice * config.gravity * (config.thickness - z)
}

/// Holds the geometry of a straight boundary facet and computes its contributions
///
/// The local equations are ordered as `(ux_a, uz_a, ux_b, uz_b)`.
pub struct FacetTerms {
    /// Points of the facet
    pub points: [PointId; 2],

    /// Elevation of the points
    pub z: [f64; 2],

    /// Length of the facet
    pub length: f64,

    /// Outward unit normal
    pub normal: [f64; 2],

    /// Unit tangent (normal rotated counterclockwise)
    pub tangent: [f64; 2],
}

impl FacetTerms {
    /// Allocates a new instance
    pub fn new(ice_mesh: &IceMesh, facet: &Facet) -> Self {
        let (nx, nz) = ice_mesh.facet_normal(facet);
        FacetTerms {
            points: [facet.a, facet.b],
            z: [ice_mesh.coords(facet.a).1, ice_mesh.coords(facet.b).1],
            length: ice_mesh.facet_length(facet),
            normal: [nx, nz],
            tangent: [-nz, nx],
        }
    }

    /// Returns the local-to-global map of equation numbers
    pub fn local_to_global(&self, equations: &Equations) -> [usize; NEQ_LOCAL_FACET] {
        [
            equations.eq(self.points[0], Dof::Ux),
            equations.eq(self.points[0], Dof::Uz),
            equations.eq(self.points[1], Dof::Ux),
            equations.eq(self.points[1], Dof::Uz),
        ]
    }

    /// Returns the entry (m, k) of the consistent mass matrix of the facet
    #[inline]
    pub fn mass(&self, m: usize, k: usize) -> f64 {
        if m == k {
            self.length / 3.0
        } else {
            self.length / 6.0
        }
    }

    /// Calculates the load due to a normal pressure `-∫ p n·v ds`
    ///
    /// The pressure is interpolated linearly from its values at the points.
    pub fn pressure_load(&self, pressure: [f64; 2]) -> [f64; NEQ_LOCAL_FACET] {
        let mut ff = [0.0; NEQ_LOCAL_FACET];
        for m in 0..2 {
            let p = self.mass(m, 0) * pressure[0] + self.mass(m, 1) * pressure[1];
            ff[2 * m] = -p * self.normal[0];
            ff[2 * m + 1] = -p * self.normal[1];
        }
        ff
    }

    /// Calculates the coefficients of the volume flux `∫ u·n ds`
    pub fn flux_row(&self) -> [f64; NEQ_LOCAL_FACET] {
        let h = 0.5 * self.length;
        [
            h * self.normal[0],
            h * self.normal[1],
            h * self.normal[0],
            h * self.normal[1],
        ]
    }

    /// Calculates the contact matrix `∫ (γ (u·n)(v·n) + β (u·t)(v·t)) ds`
    ///
    /// # Input
    ///
    /// * `penalty` -- γ, penalty coefficient of the non-penetration condition
    /// * `friction` -- β, linear friction coefficient
    pub fn contact_matrix(&self, penalty: f64, friction: f64) -> [[f64; NEQ_LOCAL_FACET]; NEQ_LOCAL_FACET] {
        let (n, t) = (self.normal, self.tangent);
        let mut kk = [[0.0; NEQ_LOCAL_FACET]; NEQ_LOCAL_FACET];
        for m in 0..2 {
            for k in 0..2 {
                let mass = self.mass(m, k);
                for d in 0..2 {
                    for e in 0..2 {
                        kk[2 * m + d][2 * k + e] = mass * (penalty * n[d] * n[e] + friction * t[d] * t[e]);
                    }
                }
            }
        }
        kk
    }

    /// Returns the mean normal velocity over the facet
    pub fn normal_velocity(&self, uu: &Vector, equations: &Equations) -> f64 {
        let mut vn = 0.0;
        for p in &self.points {
            vn += uu[equations.eq(*p, Dof::Ux)] * self.normal[0] + uu[equations.eq(*p, Dof::Uz)] * self.normal[1];
        }
        0.5 * vn
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
