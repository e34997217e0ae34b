use super::{BedProfile, Config, Facet, IceMesh, Tag};
use crate::StrError;
use gemlab::mesh::PointId;
use std::collections::BTreeSet;

/// Defines the order in which the tags are applied (last write wins)
///
/// The ice-air surface is the default; water is marked next and is then
/// overwritten by bed, left, and right, in this order. Hence, a facet near
/// `x = 0` that also touches the bed ends up tagged as `Left`.
///
/// Since the `Surface` predicate accepts every position, no facet of a mesh remains unmarked.
/// A lower-surface facet lying above `H/2` that does not touch the bed is therefore
/// tagged as `Surface` (traction free) instead of `Water`.
pub const TAG_PRECEDENCE: [Tag; 5] = [Tag::Surface, Tag::Water, Tag::Bed, Tag::Left, Tag::Right];

/// Holds the positional predicates that classify the boundary facets
pub struct Classifier<'a> {
    /// Bed topography
    pub bed: &'a BedProfile,

    /// Tolerance (minimal water depth)
    pub tol: f64,

    /// Nominal ice thickness
    pub thickness: f64,

    /// Length of the domain
    pub length: f64,
}

impl<'a> Classifier<'a> {
    /// Allocates a new instance
    pub fn new(config: &Config, bed: &'a BedProfile) -> Self {
        Classifier {
            bed,
            tol: config.tol,
            thickness: config.thickness,
            length: config.length,
        }
    }

    /// Returns whether the position (x, z) on the boundary satisfies the predicate of a tag
    pub fn contains(&self, tag: Tag, x: f64, z: f64) -> bool {
        match tag {
            Tag::Interior => false,
            Tag::Surface => true,
            Tag::Water => z < 0.5 * self.thickness,
            Tag::Bed => (z - self.bed.bed(x)) <= self.tol,
            Tag::Left => f64::abs(x) < self.tol,
            Tag::Right => f64::abs(x - self.length) < self.tol,
        }
    }

    /// Returns whether a whole facet (both points and the midpoint) satisfies the predicate of a tag
    pub fn contains_facet(&self, tag: Tag, ice_mesh: &IceMesh, facet: &Facet) -> bool {
        let (xa, za) = ice_mesh.coords(facet.a);
        let (xb, zb) = ice_mesh.coords(facet.b);
        let (xm, zm) = ice_mesh.facet_midpoint(facet);
        self.contains(tag, xa, za) && self.contains(tag, xb, zb) && self.contains(tag, xm, zm)
    }
}

/// Holds the tags of all boundary facets of the current mesh
///
/// The markers are recomputed from scratch at every time step because the geometry changes.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryMarkers {
    /// Tags with the same ordering as `IceMesh::facets`
    pub tags: Vec<Tag>,
}

impl BoundaryMarkers {
    /// Classifies all boundary facets and checks that none of them remains unmarked
    pub fn new(config: &Config, bed: &BedProfile, ice_mesh: &IceMesh) -> Result<Self, StrError> {
        let classifier = Classifier::new(config, bed);
        let mut tags = vec![Tag::Interior; ice_mesh.facets.len()];
        for tag in TAG_PRECEDENCE {
            for (f, facet) in ice_mesh.facets.iter().enumerate() {
                if classifier.contains_facet(tag, ice_mesh, facet) {
                    tags[f] = tag;
                }
            }
        }
        let markers = BoundaryMarkers { tags };
        markers.check()?;
        Ok(markers)
    }

    /// Checks that every boundary facet has been marked
    ///
    /// Only markers built or modified by hand can fail this check (see [TAG_PRECEDENCE]).
    pub fn check(&self) -> Result<(), StrError> {
        if self.tags.iter().any(|tag| *tag == Tag::Interior) {
            return Err("a boundary facet has not been marked");
        }
        Ok(())
    }

    /// Returns the integer markers (legacy convention)
    pub fn numbers(&self) -> Vec<usize> {
        self.tags.iter().map(|tag| tag.number()).collect()
    }

    /// Returns the number of facets with a given tag
    pub fn count(&self, tag: Tag) -> usize {
        self.tags.iter().filter(|t| **t == tag).count()
    }

    /// Returns the indices of the facets with a given tag
    pub fn facets_with(&self, tag: Tag) -> Vec<usize> {
        (0..self.tags.len()).filter(|f| self.tags[*f] == tag).collect()
    }

    /// Returns the (sorted) ids of the points belonging to the facets with a given tag
    pub fn points_with(&self, tag: Tag, ice_mesh: &IceMesh) -> Vec<PointId> {
        let mut points = BTreeSet::new();
        for f in self.facets_with(tag) {
            points.insert(ice_mesh.facets[f].a);
            points.insert(ice_mesh.facets[f].b);
        }
        points.into_iter().collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{BoundaryMarkers, Classifier};
    use crate::base::{BedProfile, Config, IceMesh, Tag};
    use crate::StrError;

    fn flat_bed(config: &Config) -> BedProfile {
        BedProfile::new(config.length, 0.0, config.bed_width, 0.0)
    }

    #[test]
    fn classifier_predicates_work() {
        let mut config = Config::new();
        config.length = 10.0;
        config.thickness = 4.0;
        config.tol = 0.1;
        let bed = flat_bed(&config);
        let cl = Classifier::new(&config, &bed);
        assert!(cl.contains(Tag::Surface, 5.0, 4.0));
        assert!(!cl.contains(Tag::Interior, 5.0, 4.0));
        assert!(cl.contains(Tag::Water, 5.0, 1.99));
        assert!(!cl.contains(Tag::Water, 5.0, 2.0));
        assert!(cl.contains(Tag::Bed, 5.0, 0.1));
        assert!(!cl.contains(Tag::Bed, 5.0, 0.11));
        assert!(cl.contains(Tag::Left, 0.09, 3.0));
        assert!(!cl.contains(Tag::Left, 0.1, 3.0));
        assert!(cl.contains(Tag::Right, 9.91, 3.0));
        assert!(!cl.contains(Tag::Right, 9.85, 3.0));
    }

    #[test]
    fn rectangle_is_fully_marked() -> Result<(), StrError> {
        // rectangle with flat bottom on a flat bed
        let mut config = Config::new();
        config.length = 4.0;
        config.thickness = 2.0;
        config.tol = 0.01;
        let bed = flat_bed(&config);
        let xx = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ice = IceMesh::new(&xx, 2, &[0.0; 5], &[2.0; 5])?;
        let markers = BoundaryMarkers::new(&config, &bed, &ice)?;
        assert_eq!(markers.tags.len(), 12);
        assert_eq!(markers.count(Tag::Interior), 0);
        assert_eq!(markers.count(Tag::Bed), 4);
        assert_eq!(markers.count(Tag::Left), 2);
        assert_eq!(markers.count(Tag::Right), 2);
        assert_eq!(markers.count(Tag::Surface), 4);
        assert_eq!(markers.count(Tag::Water), 0);
        for (f, facet) in ice.facets.iter().enumerate() {
            let (xm, zm) = ice.facet_midpoint(facet);
            let correct = if xm == 0.0 {
                Tag::Left
            } else if xm == 4.0 {
                Tag::Right
            } else if zm == 0.0 {
                Tag::Bed
            } else {
                Tag::Surface
            };
            assert_eq!(markers.tags[f], correct);
        }
        assert_eq!(markers.points_with(Tag::Left, &ice), &[0, 1, 2]);
        assert_eq!(markers.points_with(Tag::Right, &ice), &[12, 13, 14]);
        Ok(())
    }

    #[test]
    fn lifted_facets_are_water() -> Result<(), StrError> {
        // the middle of the bottom is lifted above the bed by more than tol
        let mut config = Config::new();
        config.length = 4.0;
        config.thickness = 2.0;
        config.tol = 0.01;
        let bed = flat_bed(&config);
        let xx = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ice = IceMesh::new(&xx, 2, &[0.0, 0.0, 0.5, 0.0, 0.0], &[2.0; 5])?;
        let markers = BoundaryMarkers::new(&config, &bed, &ice)?;
        // the two facets touching the lifted point are water; the others bed
        assert_eq!(markers.count(Tag::Water), 2);
        assert_eq!(markers.count(Tag::Bed), 2);
        let water = markers.points_with(Tag::Water, &ice);
        assert_eq!(water, &[ice.bottom(1), ice.bottom(2), ice.bottom(3)]);
        assert_eq!(markers.numbers().iter().filter(|n| **n == 4).count(), 2);
        Ok(())
    }

    #[test]
    fn high_bottom_facets_are_surface() -> Result<(), StrError> {
        // the middle of the bottom is lifted above H/2 without touching the bed
        let mut config = Config::new();
        config.length = 4.0;
        config.thickness = 2.0;
        config.tol = 0.01;
        let bed = flat_bed(&config);
        let xx = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ice = IceMesh::new(&xx, 2, &[0.0, 0.0, 1.5, 0.0, 0.0], &[2.0; 5])?;
        let markers = BoundaryMarkers::new(&config, &bed, &ice)?;
        assert_eq!(markers.count(Tag::Water), 0);
        assert_eq!(markers.count(Tag::Bed), 2);
        assert_eq!(markers.count(Tag::Surface), 6);
        let lifted = ice.bottom(2);
        for (f, facet) in ice.facets.iter().enumerate() {
            if facet.a == lifted || facet.b == lifted {
                assert_eq!(markers.tags[f], Tag::Surface);
            }
        }
        Ok(())
    }

    #[test]
    fn left_overwrites_bed() -> Result<(), StrError> {
        // a large tolerance makes the lowest wall facets satisfy the bed predicate as well
        let mut config = Config::new();
        config.tol = 200.0;
        let bed = BedProfile::from_config(&config);
        let xx = config.columns();
        let lower = bed.interface_vec(&xx);
        let upper = vec![config.thickness; config.nx];
        let ice = IceMesh::from_config(&config, &lower, &upper)?;
        let markers = BoundaryMarkers::new(&config, &bed, &ice)?;
        let cl = Classifier::new(&config, &bed);
        let mut n_checked = 0;
        for (f, facet) in ice.facets.iter().enumerate() {
            let (xm, _) = ice.facet_midpoint(facet);
            if xm == 0.0 && cl.contains_facet(Tag::Bed, &ice, facet) {
                assert_eq!(markers.tags[f], Tag::Left);
                n_checked += 1;
            }
        }
        assert!(n_checked > 0);
        Ok(())
    }

    #[test]
    fn initial_geometry_is_marked() -> Result<(), StrError> {
        let config = Config::new();
        let bed = BedProfile::from_config(&config);
        let xx = config.columns();
        let lower = bed.interface_vec(&xx);
        let upper = vec![config.thickness; config.nx];
        let ice = IceMesh::from_config(&config, &lower, &upper)?;
        let markers = BoundaryMarkers::new(&config, &bed, &ice)?;
        assert_eq!(markers.count(Tag::Surface), config.nx - 1);
        assert_eq!(markers.count(Tag::Left), config.nz);
        assert_eq!(markers.count(Tag::Right), config.nz);
        assert!(markers.count(Tag::Water) > 0);
        assert!(markers.count(Tag::Bed) > 0);
        assert_eq!(markers.count(Tag::Water) + markers.count(Tag::Bed), config.nx - 1);

        // classification is idempotent
        let again = BoundaryMarkers::new(&config, &bed, &ice)?;
        assert_eq!(again, markers);
        Ok(())
    }

    #[test]
    fn check_captures_unmarked_facets() {
        let markers = BoundaryMarkers {
            tags: vec![Tag::Left, Tag::Interior, Tag::Right],
        };
        assert_eq!(markers.check().err(), Some("a boundary facet has not been marked"));
    }
}
