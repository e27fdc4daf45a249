//! Mapping between geographic coordinates and global grid indices.

use crate::{TerrainError, C};
use geo::geometry::Coord;

/// Arrangement of tiles within a stitched grid.
///
/// Tile rows run north to south (latitudes descending) and tile
/// columns west to east (longitudes ascending). Neighboring tiles
/// share their border samples, so every tile contributes `side - 1`
/// rows and columns, except the southernmost row and easternmost
/// column of tiles which contribute all `side`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    /// Tile origin latitudes, descending.
    lats: Box<[i16]>,

    /// Tile origin longitudes, ascending.
    lons: Box<[i16]>,

    /// Samples along each side of a tile.
    side: usize,
}

impl TileLayout {
    /// Returns a layout over the given tile origins.
    ///
    /// Origins are sorted and deduplicated, so callers may pass the
    /// latitude and longitude of every tile as found.
    pub fn new<L, M>(lats: L, lons: M, side: usize) -> Result<Self, TerrainError>
    where
        L: IntoIterator<Item = i16>,
        M: IntoIterator<Item = i16>,
    {
        if side < 2 {
            return Err(TerrainError::Resolution(side));
        }
        let mut lats: Vec<i16> = lats.into_iter().collect();
        lats.sort_unstable_by(|a, b| b.cmp(a));
        lats.dedup();
        let mut lons: Vec<i16> = lons.into_iter().collect();
        lons.sort_unstable();
        lons.dedup();
        Ok(Self {
            lats: lats.into_boxed_slice(),
            lons: lons.into_boxed_slice(),
            side,
        })
    }

    /// Tile origin latitudes, north to south.
    pub fn lats(&self) -> &[i16] {
        &self.lats
    }

    /// Tile origin longitudes, west to east.
    pub fn lons(&self) -> &[i16] {
        &self.lons
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the (rows, columns) of the stitched grid.
    pub fn dimensions(&self) -> (usize, usize) {
        let cells = self.side - 1;
        (
            self.lats.len() * cells + 1,
            self.lons.len() * cells + 1,
        )
    }

    /// Returns the (row, column) of the sample covering `coord`.
    ///
    /// A tile covers `[origin, origin + 1)` along each axis. Indices
    /// are truncated, not rounded, to whole samples.
    pub fn coords_to_indices(&self, coord: Coord<C>) -> Result<(usize, usize), TerrainError> {
        let Coord { x: lon, y: lat } = coord;
        let out_of_range = || TerrainError::OutOfRange { lat, lon };

        let (lat_idx, lat0) = covering(&self.lats, lat).ok_or_else(out_of_range)?;
        let (lon_idx, lon0) = covering(&self.lons, lon).ok_or_else(out_of_range)?;

        let cells = self.side - 1;
        #[allow(clippy::cast_precision_loss)]
        let span = cells as C;
        // Tiles are stored north to south, so the row counts down
        // from the tile's northern edge.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tile_row = (span - (lat - lat0) * span) as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tile_col = ((lon - lon0) * span) as usize;

        Ok((lat_idx * cells + tile_row, lon_idx * cells + tile_col))
    }

    /// Returns the coordinate of the sample at (`row`, `col`).
    ///
    /// Every tile is addressed by `side - 1` rows and columns, so the
    /// grid's final row and column are outside the layout.
    pub fn indices_to_coords(&self, (row, col): (usize, usize)) -> Result<Coord<C>, TerrainError> {
        let cells = self.side - 1;
        match (self.lats.get(row / cells), self.lons.get(col / cells)) {
            (Some(&lat0), Some(&lon0)) => {
                #[allow(clippy::cast_precision_loss)]
                let span = cells as C;
                #[allow(clippy::cast_precision_loss)]
                let lat = C::from(lat0) + (cells - row % cells) as C / span;
                #[allow(clippy::cast_precision_loss)]
                let lon = C::from(lon0) + (col % cells) as C / span;
                Ok(Coord { x: lon, y: lat })
            }
            _ => Err(TerrainError::IndexOutOfRange { row, col }),
        }
    }
}

/// Returns the position and origin of the tile covering `deg`.
fn covering(origins: &[i16], deg: C) -> Option<(usize, C)> {
    origins
        .iter()
        .map(|&origin| C::from(origin))
        .enumerate()
        .find(|&(_, origin)| origin <= deg && deg < origin + 1.0)
}
