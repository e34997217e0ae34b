use super::{cryostatic_pressure, water_pressure, ControlConvergence, ElementStokes, Equations, FacetTerms, LinearSystem};
use super::{NEQ_LOCAL_TRIANGLE, NDOF_PER_POINT};
use crate::base::{BoundaryMarkers, Config, Dof, Essential, IceMesh, ParamIce, Tag, CONTACT_TENSION_TOL};
use crate::StrError;
use gemlab::mesh::PointId;
use russell_lab::{vec_copy, Matrix, Vector};
use std::collections::BTreeSet;

/// Implements the nonlinear Stokes solver for the ice slab
///
/// The viscosity depends on the strain rate (Glen's law); thus, the linear system is
/// assembled and solved repeatedly with the viscosity of the previous iterate (Picard).
///
/// The unknown pressure is the deviation from the cryostatic pressure `ρ_i g (H - z)`.
///
/// Boundary treatment:
///
/// * `Water` -- traction `-(p_w + λ) n` where λ is the lake pressure correction enforcing
///   `∫ u·n ds = -Q(t)` over the ice-water interface
/// * `Bed` -- penalized non-penetration and linear friction; a facet pulled away from the bed
///   (tensile reaction) is released and treated as `Water` until the end of the solve
/// * `Left`/`Right` -- essential conditions given by [Essential]; otherwise cryostatic traction
/// * `Surface` -- traction free
pub struct SolverStokes<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// Holds the parameters of Glen's law
    pub ice: ParamIce,

    /// Holds the equation numbers
    pub equations: Equations,

    /// Holds variables to solve the global linear system
    pub lin_sys: LinearSystem,

    /// Indicates which boundary facets have been released from the bed (same ordering as IceMesh::facets)
    pub released: Vec<bool>,

    /// Number of iterations at the last call to solve
    pub n_iterations: usize,

    /// Controls the convergence of the iterations
    pub control: ControlConvergence<'a>,

    // local matrix of triangles
    kk_local: Matrix,
}

impl<'a> SolverStokes<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config, ice_mesh: &IceMesh) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate solver because config.validate() failed");
        }
        let equations = Equations::new(ice_mesh.npoint());
        let lin_sys = LinearSystem::new(&equations, ice_mesh)?;
        Ok(SolverStokes {
            config,
            ice: ParamIce::from_config(config),
            equations,
            lin_sys,
            released: vec![false; ice_mesh.facets.len()],
            n_iterations: 0,
            control: ControlConvergence::new(config),
            kk_local: Matrix::new(NEQ_LOCAL_TRIANGLE, NEQ_LOCAL_TRIANGLE),
        })
    }

    /// Solves the Stokes problem at time t
    ///
    /// # Input
    ///
    /// * `uu` -- (n_equation) initial guess on input; solution (velocity, pressure, λ) on output
    pub fn solve(
        &mut self,
        ice_mesh: &IceMesh,
        markers: &BoundaryMarkers,
        essential: &Essential,
        t: f64,
        uu: &mut Vector,
    ) -> Result<(), StrError> {
        if uu.dim() != self.equations.n_equation {
            return Err("the dimension of the solution vector is incorrect");
        }
        if markers.tags.len() != ice_mesh.facets.len() {
            return Err("the number of markers must equal the number of boundary facets");
        }
        let prescribed = essential.prescribed(ice_mesh, markers);
        self.released.fill(false);
        self.control.reset();

        for iteration in 0..self.config.n_max_iterations {
            // build and solve the linear system with the viscosity of the current iterate
            self.lin_sys.begin(&self.equations, &prescribed)?;
            self.assemble_cells(ice_mesh, uu)?;
            self.assemble_facets(ice_mesh, markers, t)?;
            self.lin_sys.finalize()?;
            self.lin_sys.solve()?;

            // velocity update
            let (mut norm_du, mut norm_u) = (0.0, 0.0);
            for p in 0..self.equations.npoint {
                for d in 0..2 {
                    let eq = NDOF_PER_POINT * p + d;
                    norm_du = f64::max(norm_du, f64::abs(self.lin_sys.uu[eq] - uu[eq]));
                    norm_u = f64::max(norm_u, f64::abs(self.lin_sys.uu[eq]));
                }
            }
            vec_copy(uu, &self.lin_sys.uu)?;

            // release bed facets under tension
            let mut n_released = 0;
            for (f, facet) in ice_mesh.facets.iter().enumerate() {
                if markers.tags[f] == Tag::Bed && !self.released[f] {
                    let terms = FacetTerms::new(ice_mesh, facet);
                    let reaction = self.config.bed_penalty * terms.normal_velocity(uu, &self.equations);
                    if reaction < -CONTACT_TENSION_TOL {
                        self.released[f] = true;
                        n_released += 1;
                    }
                }
            }

            // check convergence
            self.control.analyze(iteration, norm_du, norm_u, n_released)?;
            self.control.print_iteration();
            if self.control.converged() {
                self.n_iterations = iteration + 1;
                return Ok(());
            }
        }
        self.n_iterations = self.config.n_max_iterations;
        Err("Picard iterations did not converge")
    }

    /// Returns the points in contact with the bed (on non-released bed facets)
    pub fn contact_points(&self, ice_mesh: &IceMesh, markers: &BoundaryMarkers) -> BTreeSet<PointId> {
        let mut points = BTreeSet::new();
        for (f, facet) in ice_mesh.facets.iter().enumerate() {
            if markers.tags[f] == Tag::Bed && !self.released[f] {
                points.insert(facet.a);
                points.insert(facet.b);
            }
        }
        points
    }

    /// Returns the velocity (ux, uz) at a point
    pub fn velocity(&self, uu: &Vector, point_id: PointId) -> (f64, f64) {
        (
            uu[self.equations.eq(point_id, Dof::Ux)],
            uu[self.equations.eq(point_id, Dof::Uz)],
        )
    }

    /// Adds the contributions of all triangles
    fn assemble_cells(&mut self, ice_mesh: &IceMesh, uu: &Vector) -> Result<(), StrError> {
        for cell_id in 0..ice_mesh.mesh.cells.len() {
            let element = ElementStokes::new(ice_mesh, cell_id)?;
            let (exx, ezz, exz) = element.strain_rate(uu, &self.equations);
            let eta = self.ice.viscosity(ParamIce::effective_strain_rate_sq(exx, ezz, exz));
            element.calc_kk(&mut self.kk_local, eta, self.config.stabilization);
            let l2g = element.local_to_global(&self.equations);
            self.lin_sys.assemble_matrix(&l2g, &self.kk_local)?;
        }
        Ok(())
    }

    /// Adds the boundary loads, the bed contact, and the volume constraint
    ///
    /// Since gravity is balanced by the cryostatic pressure `p_c`, every traction `t` becomes
    /// the load `t + p_c n`. The walls carry the cryostatic traction (zero load).
    fn assemble_facets(&mut self, ice_mesh: &IceMesh, markers: &BoundaryMarkers, t: f64) -> Result<(), StrError> {
        let lambda = self.equations.lambda();
        let mut has_water = false;
        for (f, facet) in ice_mesh.facets.iter().enumerate() {
            let tag = markers.tags[f];
            if tag == Tag::Left || tag == Tag::Right {
                continue;
            }
            let terms = FacetTerms::new(ice_mesh, facet);
            let l2g = terms.local_to_global(&self.equations);
            let wet = tag == Tag::Water || (tag == Tag::Bed && self.released[f]);
            let mut pressure = [0.0; 2];
            for m in 0..2 {
                let pc = cryostatic_pressure(self.config, terms.z[m]);
                pressure[m] = if wet {
                    water_pressure(self.config, terms.z[m]) - pc
                } else {
                    -pc
                };
            }
            self.lin_sys.assemble_vector(&l2g, &terms.pressure_load(pressure));
            if wet {
                self.lin_sys.assemble_coupling(&l2g, lambda, &terms.flux_row())?;
                has_water = true;
            } else if tag == Tag::Bed {
                let kk = terms.contact_matrix(self.config.bed_penalty, self.config.friction);
                for l in 0..l2g.len() {
                    for m in 0..l2g.len() {
                        self.lin_sys.put(l2g[l], l2g[m], kk[l][m])?;
                    }
                }
            }
        }

        // volume constraint: ∫ u·n ds = -Q(t)
        if has_water {
            self.lin_sys.ff[lambda] -= self.config.inflow_rate(t);
        } else {
            self.lin_sys.put(lambda, lambda, 1.0)?;
            self.lin_sys.ff[lambda] = 0.0;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
