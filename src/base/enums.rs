use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Defines degrees-of-freedom (DOF) types
///
/// Note: The fixed numbering scheme is used to compute equation numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Dof {
    /// Horizontal velocity
    Ux = 0,

    /// Vertical velocity
    Uz = 1,

    /// Pressure
    P = 2,
}

/// Defines the boundary markers (tags) of the facets
///
/// The numbers 0 to 4 follow the convention of the legacy result consumers.
/// The ice-air surface is tagged explicitly with 5 so that `Interior = 0`
/// never appears on a true boundary facet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Tag {
    /// Unmarked (interior) facet
    Interior = 0,

    /// Left boundary (x = 0)
    Left = 1,

    /// Right boundary (x = L)
    Right = 2,

    /// Ice-bed boundary (grounded ice)
    Bed = 3,

    /// Ice-water boundary
    Water = 4,

    /// Ice-air boundary (upper surface)
    Surface = 5,
}

impl Tag {
    /// Returns the integer marker
    pub fn number(&self) -> usize {
        *self as usize
    }

    /// Returns the tag corresponding to an integer marker
    pub fn from_number(number: usize) -> Result<Self, StrError> {
        match number {
            0 => Ok(Tag::Interior),
            1 => Ok(Tag::Left),
            2 => Ok(Tag::Right),
            3 => Ok(Tag::Bed),
            4 => Ok(Tag::Water),
            5 => Ok(Tag::Surface),
            _ => Err("boundary marker number must be in [0, 5]"),
        }
    }
}

/// Defines the boundary condition at the left and right walls
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WallBcs {
    /// Zero horizontal velocity at the walls (closed system)
    Dirichlet,

    /// Free-slip walls (no constraint; natural boundary condition)
    Neumann,
}

impl FromStr for WallBcs {
    type Err = StrError;
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "dirichlet" => Ok(WallBcs::Dirichlet),
            "neumann" => Ok(WallBcs::Neumann),
            _ => Err("wall_bcs must be either \"dirichlet\" or \"neumann\""),
        }
    }
}

impl fmt::Display for WallBcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WallBcs::Dirichlet => write!(f, "dirichlet"),
            WallBcs::Neumann => write!(f, "neumann"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
