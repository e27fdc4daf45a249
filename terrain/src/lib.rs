//! # Terrain
//!
//! `terrain` stitches a region's SRTM tiles into a single elevation
//! grid and maps between geographic coordinates and grid indices.

mod error;
mod grid;
mod layout;
mod patch;
mod region;
mod store;

pub use crate::{
    error::TerrainError,
    grid::ElevationGrid,
    layout::TileLayout,
    patch::TerrainPatch,
    region::Region,
    store::{TerrainStore, TerrainStoreBuilder, TileMode},
};
pub use {geo, srtm};

/// Floating point type used for coordinates and distances.
pub type C = f64;

/// Ground distance spanned by one degree, used for every cell
/// regardless of latitude.
pub const METERS_PER_DEGREE: C = 111_000.0;
