use super::Config;
use serde::{Deserialize, Serialize};

/// Defines the bed topography: a smooth (Gaussian) depression centered in the domain
///
/// ```text
/// B(x) = -depth · exp(-(x - L/2)² / width²) + offset
/// ```
///
/// The bed equals `offset` far from the center and `offset - depth` at `x = L/2`.
/// All functions are total: any real `x` is accepted (the domain is not enforced).
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct BedProfile {
    /// Length of the domain L
    pub length: f64,

    /// Depth of the depression
    pub depth: f64,

    /// Width of the depression
    pub width: f64,

    /// Far-field elevation
    pub offset: f64,
}

impl BedProfile {
    /// Allocates a new instance
    pub fn new(length: f64, depth: f64, width: f64, offset: f64) -> Self {
        BedProfile {
            length,
            depth,
            width,
            offset,
        }
    }

    /// Allocates a new instance with the parameters from the configuration
    pub fn from_config(config: &Config) -> Self {
        BedProfile::new(config.length, config.bed_depth, config.bed_width, config.bed_offset)
    }

    /// Returns the center of the depression (L/2)
    pub fn center(&self) -> f64 {
        self.length / 2.0
    }

    /// Returns the bed elevation at x
    pub fn bed(&self, x: f64) -> f64 {
        let d = x - self.center();
        -self.depth * f64::exp(-(d * d) / (self.width * self.width)) + self.offset
    }

    /// Returns the initial ice-water (or ice-bed) interface elevation at x
    ///
    /// The interface is `max(0, bed(x))`; thus, it never lies below the bed
    /// and coincides with the bed wherever the bed is non-negative.
    pub fn interface(&self, x: f64) -> f64 {
        f64::max(0.0, self.bed(x))
    }

    /// Evaluates the bed elevation at many positions
    pub fn bed_vec(&self, xx: &[f64]) -> Vec<f64> {
        xx.iter().map(|x| self.bed(*x)).collect()
    }

    /// Evaluates the initial interface elevation at many positions
    pub fn interface_vec(&self, xx: &[f64]) -> Vec<f64> {
        xx.iter().map(|x| self.interface(*x)).collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
