use super::{Equations, NDOF_PER_POINT};
use crate::base::{Dof, IceMesh};
use crate::StrError;
use gemlab::mesh::{CellId, PointId};
use russell_lab::{Matrix, Vector};

/// Number of local equations of a triangle (3 points × (ux, uz, p))
pub const NEQ_LOCAL_TRIANGLE: usize = 3 * NDOF_PER_POINT;

/// Implements the linear triangle for the (stabilized) Stokes equations
///
/// Velocity and pressure are both interpolated linearly (equal order). The
/// Brezzi-Pitkäranta term `-α h²/η ∫ ∇p·∇q` stabilizes the pressure.
///
/// The local equations are ordered as `(ux₀, uz₀, p₀, ux₁, uz₁, p₁, ux₂, uz₂, p₂)`.
pub struct ElementStokes {
    /// Points of the triangle (counterclockwise)
    pub points: [PointId; 3],

    /// Area of the triangle
    pub area: f64,

    /// Derivatives of the shape functions with respect to x
    pub bx: [f64; 3],

    /// Derivatives of the shape functions with respect to z
    pub bz: [f64; 3],

    /// Squared element size (longest edge)
    pub h2: f64,
}

impl ElementStokes {
    /// Allocates a new instance
    pub fn new(ice_mesh: &IceMesh, cell_id: CellId) -> Result<Self, StrError> {
        let cell = &ice_mesh.mesh.cells[cell_id];
        if cell.points.len() != 3 {
            return Err("the Stokes element requires triangles with 3 points");
        }
        let points = [cell.points[0], cell.points[1], cell.points[2]];
        let (x0, z0) = ice_mesh.coords(points[0]);
        let (x1, z1) = ice_mesh.coords(points[1]);
        let (x2, z2) = ice_mesh.coords(points[2]);
        let area2 = (x1 - x0) * (z2 - z0) - (x2 - x0) * (z1 - z0);
        if !(area2 > 0.0) {
            return Err("found a triangle with non-positive area");
        }
        let bx = [(z1 - z2) / area2, (z2 - z0) / area2, (z0 - z1) / area2];
        let bz = [(x2 - x1) / area2, (x0 - x2) / area2, (x1 - x0) / area2];
        let h2 = [
            (x1 - x0) * (x1 - x0) + (z1 - z0) * (z1 - z0),
            (x2 - x1) * (x2 - x1) + (z2 - z1) * (z2 - z1),
            (x0 - x2) * (x0 - x2) + (z0 - z2) * (z0 - z2),
        ]
        .into_iter()
        .fold(0.0, f64::max);
        Ok(ElementStokes {
            points,
            area: 0.5 * area2,
            bx,
            bz,
            h2,
        })
    }

    /// Returns the local-to-global map of equation numbers
    pub fn local_to_global(&self, equations: &Equations) -> [usize; NEQ_LOCAL_TRIANGLE] {
        let mut l2g = [0; NEQ_LOCAL_TRIANGLE];
        for m in 0..3 {
            l2g[3 * m] = equations.eq(self.points[m], Dof::Ux);
            l2g[3 * m + 1] = equations.eq(self.points[m], Dof::Uz);
            l2g[3 * m + 2] = equations.eq(self.points[m], Dof::P);
        }
        l2g
    }

    /// Calculates the (constant) strain rate components (ε̇xx, ε̇zz, ε̇xz)
    pub fn strain_rate(&self, uu: &Vector, equations: &Equations) -> (f64, f64, f64) {
        let (mut exx, mut ezz, mut exz) = (0.0, 0.0, 0.0);
        for m in 0..3 {
            let ux = uu[equations.eq(self.points[m], Dof::Ux)];
            let uz = uu[equations.eq(self.points[m], Dof::Uz)];
            exx += self.bx[m] * ux;
            ezz += self.bz[m] * uz;
            exz += 0.5 * (self.bz[m] * ux + self.bx[m] * uz);
        }
        (exx, ezz, exz)
    }

    /// Calculates the local matrix
    ///
    /// # Input
    ///
    /// * `kk` -- (9,9) local matrix
    /// * `eta` -- effective viscosity of the element
    /// * `alpha` -- stabilization coefficient
    pub fn calc_kk(&self, kk: &mut Matrix, eta: f64, alpha: f64) {
        let a = self.area;
        let c = 2.0 * eta * a;
        let s = alpha * self.h2 / eta * a;
        for m in 0..3 {
            let (bxm, bzm) = (self.bx[m], self.bz[m]);
            for n in 0..3 {
                let (bxn, bzn) = (self.bx[n], self.bz[n]);
                let (i, j) = (3 * m, 3 * n);
                // viscous terms 2η ε̇(u):ε̇(v)
                kk.set(i, j, c * (bxm * bxn + 0.5 * bzm * bzn));
                kk.set(i, j + 1, c * 0.5 * bzm * bxn);
                kk.set(i + 1, j, c * 0.5 * bxm * bzn);
                kk.set(i + 1, j + 1, c * (bzm * bzn + 0.5 * bxm * bxn));
                // pressure gradient -∫ p div(v)
                kk.set(i, j + 2, -bxm * a / 3.0);
                kk.set(i + 1, j + 2, -bzm * a / 3.0);
                // continuity -∫ q div(u)
                kk.set(i + 2, j, -bxn * a / 3.0);
                kk.set(i + 2, j + 1, -bzn * a / 3.0);
                // stabilization
                kk.set(i + 2, j + 2, -s * (bxm * bxn + bzm * bzn));
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{ElementStokes, NEQ_LOCAL_TRIANGLE};
    use crate::base::{Config, Dof, IceMesh, ParamIce};
    use crate::fem::Equations;
    use crate::StrError;
    use russell_lab::{approx_eq, Matrix, Vector};

    fn sample_mesh() -> IceMesh {
        // two columns, one layer: cells [0,2,3] and [0,3,1]
        IceMesh::new(&[0.0, 2.0], 1, &[0.0, 0.0], &[1.0, 1.0]).unwrap()
    }

    #[test]
    fn new_works() -> Result<(), StrError> {
        let ice = sample_mesh();
        let e = ElementStokes::new(&ice, 0)?;
        assert_eq!(e.points, [0, 2, 3]);
        assert_eq!(e.area, 1.0);
        approx_eq(e.bx.iter().sum(), 0.0, 1e-15);
        approx_eq(e.bz.iter().sum(), 0.0, 1e-15);
        assert_eq!(e.h2, 5.0);
        // gradients of the linear function f = 3x + 2z
        let f: Vec<_> = e.points.iter().map(|p| {
            let (x, z) = ice.coords(*p);
            3.0 * x + 2.0 * z
        }).collect();
        let dfdx: f64 = (0..3).map(|m| e.bx[m] * f[m]).sum();
        let dfdz: f64 = (0..3).map(|m| e.bz[m] * f[m]).sum();
        approx_eq(dfdx, 3.0, 1e-14);
        approx_eq(dfdz, 2.0, 1e-14);
        Ok(())
    }

    #[test]
    fn new_captures_errors() {
        let mut ice = sample_mesh();
        ice.mesh.cells[0].points = vec![0, 3, 2]; // clockwise
        assert_eq!(
            ElementStokes::new(&ice, 0).err(),
            Some("found a triangle with non-positive area")
        );
        ice.mesh.cells[0].points = vec![0, 3];
        assert_eq!(
            ElementStokes::new(&ice, 0).err(),
            Some("the Stokes element requires triangles with 3 points")
        );
    }

    #[test]
    fn strain_rate_works() -> Result<(), StrError> {
        let ice = sample_mesh();
        let equations = Equations::new(ice.npoint());
        let e = ElementStokes::new(&ice, 1)?;
        // u = (a x + b z, c x - a z)
        let (a, b, c) = (1e-3, 2e-3, 4e-3);
        let mut uu = Vector::new(equations.n_equation);
        for p in 0..ice.npoint() {
            let (x, z) = ice.coords(p);
            uu[equations.eq(p, Dof::Ux)] = a * x + b * z;
            uu[equations.eq(p, Dof::Uz)] = c * x - a * z;
        }
        let (exx, ezz, exz) = e.strain_rate(&uu, &equations);
        approx_eq(exx, a, 1e-15);
        approx_eq(ezz, -a, 1e-15);
        approx_eq(exz, 0.5 * (b + c), 1e-15);
        Ok(())
    }

    #[test]
    fn calc_kk_works() -> Result<(), StrError> {
        let ice = sample_mesh();
        let e = ElementStokes::new(&ice, 0)?;
        let mut kk = Matrix::new(NEQ_LOCAL_TRIANGLE, NEQ_LOCAL_TRIANGLE);
        let eta = 10.0;
        e.calc_kk(&mut kk, eta, 0.1);

        // symmetry
        for i in 0..NEQ_LOCAL_TRIANGLE {
            for j in 0..NEQ_LOCAL_TRIANGLE {
                approx_eq(kk.get(i, j), kk.get(j, i), 1e-14);
            }
        }

        // rigid body modes produce no forces: translations and rotation
        let coords: Vec<_> = e.points.iter().map(|p| ice.coords(*p)).collect();
        let modes: [Box<dyn Fn(f64, f64) -> (f64, f64)>; 3] = [
            Box::new(|_, _| (1.0, 0.0)),
            Box::new(|_, _| (0.0, 1.0)),
            Box::new(|x, z| (-z, x)),
        ];
        for mode in modes.iter() {
            let mut u = [0.0; NEQ_LOCAL_TRIANGLE];
            for m in 0..3 {
                let (ux, uz) = mode(coords[m].0, coords[m].1);
                u[3 * m] = ux;
                u[3 * m + 1] = uz;
            }
            for i in 0..NEQ_LOCAL_TRIANGLE {
                let f: f64 = (0..NEQ_LOCAL_TRIANGLE).map(|j| kk.get(i, j) * u[j]).sum();
                approx_eq(f, 0.0, 1e-12);
            }
        }

        // a uniform pressure yields zero net force
        let mut fx = 0.0;
        let mut fz = 0.0;
        for m in 0..3 {
            for n in 0..3 {
                fx += kk.get(3 * m, 3 * n + 2);
                fz += kk.get(3 * m + 1, 3 * n + 2);
            }
        }
        approx_eq(fx, 0.0, 1e-14);
        approx_eq(fz, 0.0, 1e-14);
        Ok(())
    }

    #[test]
    fn glen_shear_stress_works() -> Result<(), StrError> {
        // simple shear ux = γ z over a slab; the stress must follow τ = A^(-1/n) ε̇ₑ^(1/n)
        let config = Config::new();
        let ice_param = ParamIce::from_config(&config);
        let ice = IceMesh::new(&[0.0, 500.0, 1000.0, 1500.0], 3, &[0.0; 4], &[1000.0; 4])?;
        let equations = Equations::new(ice.npoint());
        let gamma = 1e-8;
        let mut uu = Vector::new(equations.n_equation);
        for p in 0..ice.npoint() {
            let (_, z) = ice.coords(p);
            uu[equations.eq(p, Dof::Ux)] = gamma * z;
        }
        for cell_id in 0..ice.mesh.cells.len() {
            let e = ElementStokes::new(&ice, cell_id)?;
            let (exx, ezz, exz) = e.strain_rate(&uu, &equations);
            assert!(f64::abs(exx) < 1e-20);
            assert!(f64::abs(ezz) < 1e-20);
            approx_eq(exz / (0.5 * gamma), 1.0, 1e-12);
            let ee_sq = ParamIce::effective_strain_rate_sq(exx, ezz, exz);
            let ee = f64::sqrt(ee_sq);
            let tau = 2.0 * ice_param.viscosity(ee_sq) * ee;
            let correct = f64::powf(config.rate_factor, -1.0 / config.glen_n) * f64::powf(ee, 1.0 / config.glen_n);
            approx_eq(tau / correct, 1.0, 1e-6);
        }
        Ok(())
    }
}
