use super::{Equations, NEQ_LOCAL_TRIANGLE};
use crate::base::{Dof, IceMesh};
use crate::StrError;
use gemlab::mesh::PointId;
use russell_lab::{Matrix, Vector};
use russell_sparse::{Genie, LinSolver, SparseMatrix, Sym};
use std::collections::BTreeMap;

/// Number of local equations of a boundary facet (2 points × (ux, uz))
pub const NEQ_LOCAL_FACET: usize = 4;

/// Holds variables to solve the global linear system
///
/// The prescribed equations are removed from the system by putting ones on the
/// diagonal of the global matrix; their known values are moved to the right-hand side.
pub struct LinearSystem {
    /// Total number of global equations (total number of DOFs plus the lake multiplier)
    pub n_equation: usize,

    /// Holds the supremum of the number of nonzero values (nnz) in the global matrix
    ///
    /// **Notes:**
    ///
    /// 1. Each triangle contributes at most 9 × 9 entries
    /// 2. Each boundary facet contributes at most 4 × 4 entries (bed contact) or
    ///    2 × 4 entries (coupling with the lake multiplier)
    /// 3. The diagonal may receive ones for the prescribed equations and for the lake multiplier
    ///
    /// Thus `nnz ≤ 81 ncell + 24 nfacet + n_equation`
    pub nnz_sup: usize,

    /// Indicates which equations are prescribed (length = n_equation)
    pub prescribed: Vec<bool>,

    /// Holds the prescribed values (length = n_equation; zero if not prescribed)
    pub values: Vec<f64>,

    /// Holds the global matrix K
    pub kk: SparseMatrix,

    /// Holds the right-hand side vector F
    pub ff: Vector,

    /// Holds the solution vector (velocity, pressure, and lake multiplier)
    pub uu: Vector,
}

impl LinearSystem {
    /// Allocates a new instance
    pub fn new(equations: &Equations, ice_mesh: &IceMesh) -> Result<Self, StrError> {
        let n_equation = equations.n_equation;
        let ncell = ice_mesh.mesh.cells.len();
        let nfacet = ice_mesh.facets.len();
        let nnz_sup = ncell * NEQ_LOCAL_TRIANGLE * NEQ_LOCAL_TRIANGLE
            + nfacet * (NEQ_LOCAL_FACET * NEQ_LOCAL_FACET + 2 * NEQ_LOCAL_FACET)
            + n_equation;
        Ok(LinearSystem {
            n_equation,
            nnz_sup,
            prescribed: vec![false; n_equation],
            values: vec![0.0; n_equation],
            kk: SparseMatrix::new_coo(n_equation, n_equation, nnz_sup, Sym::No)?,
            ff: Vector::new(n_equation),
            uu: Vector::new(n_equation),
        })
    }

    /// Clears K and F and sets the prescribed equations
    pub fn begin(&mut self, equations: &Equations, prescribed: &BTreeMap<(PointId, Dof), f64>) -> Result<(), StrError> {
        self.kk.reset()?;
        self.ff.fill(0.0);
        self.prescribed.fill(false);
        self.values.fill(0.0);
        for ((point_id, dof), value) in prescribed {
            let eq = equations.eq(*point_id, *dof);
            if eq >= self.n_equation {
                return Err("prescribed point is out of range");
            }
            self.prescribed[eq] = true;
            self.values[eq] = *value;
        }
        Ok(())
    }

    /// Adds a single entry to K, handling prescribed rows and columns
    #[inline]
    pub fn put(&mut self, i: usize, j: usize, value: f64) -> Result<(), StrError> {
        if self.prescribed[i] {
            return Ok(());
        }
        if self.prescribed[j] {
            self.ff[i] -= value * self.values[j];
            return Ok(());
        }
        self.kk.put(i, j, value)
    }

    /// Adds a local matrix to K
    pub fn assemble_matrix(&mut self, l2g: &[usize], kk_local: &Matrix) -> Result<(), StrError> {
        for (l, i) in l2g.iter().enumerate() {
            for (m, j) in l2g.iter().enumerate() {
                self.put(*i, *j, kk_local.get(l, m))?;
            }
        }
        Ok(())
    }

    /// Adds a local vector to F (prescribed rows are skipped)
    pub fn assemble_vector(&mut self, l2g: &[usize], ff_local: &[f64]) {
        for (l, i) in l2g.iter().enumerate() {
            if !self.prescribed[*i] {
                self.ff[*i] += ff_local[l];
            }
        }
    }

    /// Adds the symmetric coupling between the equations `l2g` and the equation `k`
    ///
    /// Puts `row[l]` at `K[l2g[l], k]` and `K[k, l2g[l]]`.
    pub fn assemble_coupling(&mut self, l2g: &[usize], k: usize, row: &[f64]) -> Result<(), StrError> {
        for (l, i) in l2g.iter().enumerate() {
            self.put(*i, k, row[l])?;
            self.put(k, *i, row[l])?;
        }
        Ok(())
    }

    /// Puts ones on the diagonal of the prescribed equations and sets their values in F
    pub fn finalize(&mut self) -> Result<(), StrError> {
        for eq in 0..self.n_equation {
            if self.prescribed[eq] {
                self.kk.put(eq, eq, 1.0)?;
                self.ff[eq] = self.values[eq];
            }
        }
        Ok(())
    }

    /// Factorizes K and solves K U = F
    ///
    /// A new solver is allocated because the sparsity pattern changes with the contact state.
    pub fn solve(&mut self) -> Result<(), StrError> {
        let mut solver = LinSolver::new(Genie::Umfpack)?;
        solver.actual.factorize(&mut self.kk, None)?;
        solver.actual.solve(&mut self.uu, &self.kk, &self.ff, false)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LinearSystem;
    use crate::base::{Dof, IceMesh};
    use crate::fem::Equations;
    use crate::StrError;
    use russell_lab::{approx_eq, Matrix};
    use std::collections::BTreeMap;

    #[test]
    fn new_works() -> Result<(), StrError> {
        let ice = IceMesh::new(&[0.0, 1.0, 2.0], 2, &[0.0; 3], &[2.0; 3])?;
        let equations = Equations::new(ice.npoint());
        let lin_sys = LinearSystem::new(&equations, &ice)?;
        assert_eq!(lin_sys.n_equation, 28);
        assert_eq!(lin_sys.nnz_sup, 8 * 81 + 8 * 24 + 28);
        assert_eq!(lin_sys.prescribed.len(), 28);
        assert_eq!(lin_sys.uu.dim(), 28);
        Ok(())
    }

    #[test]
    fn prescribed_equations_are_eliminated() -> Result<(), StrError> {
        // a single point (3 equations + 1 multiplier) with a 2×2 block on (ux, uz)
        let ice = IceMesh::new(&[0.0, 1.0], 1, &[0.0; 2], &[1.0; 2])?;
        let equations = Equations::new(ice.npoint());
        let mut lin_sys = LinearSystem::new(&equations, &ice)?;
        let mut prescribed = BTreeMap::new();
        prescribed.insert((0, Dof::Ux), 2.0);
        lin_sys.begin(&equations, &prescribed)?;

        // [4 1] [ux]   [10]
        // [1 3] [uz] = [ 7]   with ux = 2  ⇒  uz = (7 - 2) / 3
        let mut kk = Matrix::new(2, 2);
        kk.set(0, 0, 4.0);
        kk.set(0, 1, 1.0);
        kk.set(1, 0, 1.0);
        kk.set(1, 1, 3.0);
        lin_sys.assemble_matrix(&[0, 1], &kk)?;
        lin_sys.assemble_vector(&[0, 1], &[10.0, 7.0]);

        // fill the remaining diagonal to make the system regular
        for eq in 2..equations.n_equation {
            lin_sys.put(eq, eq, 1.0)?;
        }
        lin_sys.finalize()?;
        lin_sys.solve()?;
        approx_eq(lin_sys.uu[0], 2.0, 1e-14);
        approx_eq(lin_sys.uu[1], 5.0 / 3.0, 1e-14);
        for eq in 2..equations.n_equation {
            assert_eq!(lin_sys.uu[eq], 0.0);
        }
        Ok(())
    }

    #[test]
    fn coupling_is_symmetric() -> Result<(), StrError> {
        let ice = IceMesh::new(&[0.0, 1.0], 1, &[0.0; 2], &[1.0; 2])?;
        let equations = Equations::new(ice.npoint());
        let mut lin_sys = LinearSystem::new(&equations, &ice)?;
        lin_sys.begin(&equations, &BTreeMap::new())?;

        // x + λ = 1 ; x = 3  ⇒  λ = -2
        let k = equations.lambda();
        lin_sys.put(0, 0, 1.0)?;
        lin_sys.assemble_coupling(&[0], k, &[1.0])?;
        lin_sys.ff[0] = 1.0;
        lin_sys.ff[k] = 3.0;
        for eq in 1..k {
            lin_sys.put(eq, eq, 1.0)?;
        }
        lin_sys.finalize()?;
        lin_sys.solve()?;
        approx_eq(lin_sys.uu[0], 3.0, 1e-14);
        approx_eq(lin_sys.uu[k], -2.0, 1e-14);
        Ok(())
    }
}
