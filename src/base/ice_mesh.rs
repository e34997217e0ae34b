use super::Config;
use crate::StrError;
use gemlab::mesh::{Cell, Mesh, Point, PointId};
use gemlab::shapes::GeoKind;
use std::collections::BTreeMap;

/// Defines a boundary facet (edge) of the mesh
///
/// The facet is oriented counterclockwise with respect to the domain;
/// hence, the outward normal points to the right of `a → b`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Facet {
    /// First point
    pub a: PointId,

    /// Second point
    pub b: PointId,
}

/// Holds the triangle mesh of the ice body
///
/// The mesh is structured in `nx` vertical columns at fixed abscissae. Each column spans from
/// the lower surface (ice-bed or ice-water interface) to the upper surface (ice-air) with
/// `nz + 1` equally spaced points. Only the z-coordinates change when the mesh is deformed;
/// thus, the connectivity and the list of boundary facets are computed once.
///
/// ```text
///  top    (0,nz)------(1,nz)-- ... --(nx-1,nz)
///           |     .`    |                |
///           |  .`       |                |
///  bottom (0,0)-------(1,0)--- ... --(nx-1,0)
/// ```
#[derive(Clone, Debug)]
pub struct IceMesh {
    /// Holds the points and triangles
    pub mesh: Mesh,

    /// Number of columns
    pub nx: usize,

    /// Number of layers
    pub nz: usize,

    /// Abscissae of the columns (fixed)
    pub xx: Vec<f64>,

    /// Boundary facets (sorted by their point ids)
    pub facets: Vec<Facet>,
}

impl IceMesh {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `xx` -- (nx) abscissae of the columns in increasing order
    /// * `nz` -- number of layers
    /// * `lower` -- (nx) elevation of the lower surface
    /// * `upper` -- (nx) elevation of the upper surface
    pub fn new(xx: &[f64], nz: usize, lower: &[f64], upper: &[f64]) -> Result<Self, StrError> {
        let nx = xx.len();
        if nx < 2 {
            return Err("the number of columns must be ≥ 2");
        }
        if nz < 1 {
            return Err("the number of layers must be ≥ 1");
        }
        for i in 1..nx {
            if xx[i] <= xx[i - 1] {
                return Err("the abscissae of the columns must be increasing");
            }
        }

        // points (coordinates are set by deform)
        let npoint = nx * (nz + 1);
        let points: Vec<_> = (0..npoint)
            .map(|id| Point {
                id,
                marker: 0,
                coords: vec![xx[id / (nz + 1)], 0.0],
            })
            .collect();

        // cells: two triangles per quadrilateral
        let mut cells = Vec::with_capacity(2 * (nx - 1) * nz);
        for i in 0..(nx - 1) {
            for k in 0..nz {
                let a = i * (nz + 1) + k;
                let b = (i + 1) * (nz + 1) + k;
                let c = b + 1;
                let d = a + 1;
                let id = cells.len();
                cells.push(Cell {
                    id,
                    attribute: 1,
                    kind: GeoKind::Tri3,
                    points: vec![a, b, c],
                });
                cells.push(Cell {
                    id: id + 1,
                    attribute: 1,
                    kind: GeoKind::Tri3,
                    points: vec![a, c, d],
                });
            }
        }

        let mesh = Mesh { ndim: 2, points, cells };
        let facets = boundary_facets(&mesh);
        let mut ice_mesh = IceMesh {
            mesh,
            nx,
            nz,
            xx: xx.to_vec(),
            facets,
        };
        ice_mesh.deform(lower, upper)?;
        Ok(ice_mesh)
    }

    /// Allocates a new instance with the columns defined in the configuration
    pub fn from_config(config: &Config, lower: &[f64], upper: &[f64]) -> Result<Self, StrError> {
        IceMesh::new(&config.columns(), config.nz, lower, upper)
    }

    /// Moves the points of every column to fit in between the lower and upper surfaces
    pub fn deform(&mut self, lower: &[f64], upper: &[f64]) -> Result<(), StrError> {
        if lower.len() != self.nx || upper.len() != self.nx {
            return Err("the surface arrays must have length equal to nx");
        }
        for i in 0..self.nx {
            let thickness = upper[i] - lower[i];
            if !(thickness > 0.0) {
                return Err("the ice thickness must be positive in every column");
            }
            for k in 0..=self.nz {
                let z = lower[i] + thickness * (k as f64) / (self.nz as f64);
                let p = self.point_id(i, k);
                self.mesh.points[p].coords[1] = z;
            }
        }
        Ok(())
    }

    /// Returns the id of the point at column i and level k
    #[inline]
    pub fn point_id(&self, i: usize, k: usize) -> PointId {
        i * (self.nz + 1) + k
    }

    /// Returns the id of the point on the lower surface of column i
    #[inline]
    pub fn bottom(&self, i: usize) -> PointId {
        self.point_id(i, 0)
    }

    /// Returns the id of the point on the upper surface of column i
    #[inline]
    pub fn top(&self, i: usize) -> PointId {
        self.point_id(i, self.nz)
    }

    /// Returns the coordinates of a point
    #[inline]
    pub fn coords(&self, p: PointId) -> (f64, f64) {
        let c = &self.mesh.points[p].coords;
        (c[0], c[1])
    }

    /// Returns the elevation of the lower surface
    pub fn lower_surface(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.coords(self.bottom(i)).1).collect()
    }

    /// Returns the elevation of the upper surface
    pub fn upper_surface(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.coords(self.top(i)).1).collect()
    }

    /// Returns the number of points
    pub fn npoint(&self) -> usize {
        self.mesh.points.len()
    }

    /// Returns the length of a facet
    pub fn facet_length(&self, facet: &Facet) -> f64 {
        let (xa, za) = self.coords(facet.a);
        let (xb, zb) = self.coords(facet.b);
        f64::sqrt((xb - xa) * (xb - xa) + (zb - za) * (zb - za))
    }

    /// Returns the outward unit normal of a facet
    pub fn facet_normal(&self, facet: &Facet) -> (f64, f64) {
        let (xa, za) = self.coords(facet.a);
        let (xb, zb) = self.coords(facet.b);
        let l = self.facet_length(facet);
        ((zb - za) / l, -(xb - xa) / l)
    }

    /// Returns the midpoint of a facet
    pub fn facet_midpoint(&self, facet: &Facet) -> (f64, f64) {
        let (xa, za) = self.coords(facet.a);
        let (xb, zb) = self.coords(facet.b);
        (0.5 * (xa + xb), 0.5 * (za + zb))
    }
}

/// Finds the boundary facets (edges shared by a single triangle)
fn boundary_facets(mesh: &Mesh) -> Vec<Facet> {
    let mut edges: BTreeMap<(PointId, PointId), (Facet, usize)> = BTreeMap::new();
    for cell in &mesh.cells {
        let n = cell.points.len();
        for m in 0..n {
            let a = cell.points[m];
            let b = cell.points[(m + 1) % n];
            let key = if a < b { (a, b) } else { (b, a) };
            edges.entry(key).or_insert((Facet { a, b }, 0)).1 += 1;
        }
    }
    edges
        .values()
        .filter(|(_, count)| *count == 1)
        .map(|(facet, _)| *facet)
        .collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
