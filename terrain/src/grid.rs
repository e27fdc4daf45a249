//! Tiles stitched into a single elevation grid.

use crate::{TerrainError, TileLayout, C, METERS_PER_DEGREE};
use geo::geometry::Coord;
use srtm::{Tile, VOID};

/// One rectangular array of elevation samples covering every tile in
/// a [`TileLayout`].
///
/// Rows grow southward and columns eastward. Samples of missing tiles
/// are void.
pub struct ElevationGrid {
    layout: TileLayout,
    rows: usize,
    cols: usize,
    samples: Box<[i16]>,
}

impl ElevationGrid {
    /// Stitches tiles into a grid.
    ///
    /// `tile_for` is called once per tile position in `layout`, north
    /// to south then west to east, with the tile's southwest corner.
    /// The last row and column of a tile are dropped wherever a
    /// neighbor to the south or east supplies the same samples.
    pub fn assemble<F>(layout: TileLayout, mut tile_for: F) -> Self
    where
        F: FnMut(Coord<i16>) -> Tile,
    {
        let side = layout.side();
        let cells = side - 1;
        let (rows, cols) = layout.dimensions();
        let (n_lats, n_lons) = (layout.lats().len(), layout.lons().len());
        let mut samples = vec![VOID; rows * cols].into_boxed_slice();

        for (lat_idx, &y) in layout.lats().iter().enumerate() {
            let tile_rows = if lat_idx + 1 == n_lats { side } else { cells };
            for (lon_idx, &x) in layout.lons().iter().enumerate() {
                let tile = tile_for(Coord { x, y });
                if tile.is_void() {
                    continue;
                }
                let tile_cols = if lon_idx + 1 == n_lons { side } else { cells };
                for tile_row in 0..tile_rows {
                    let start = (lat_idx * cells + tile_row) * cols + lon_idx * cells;
                    for (dst, src) in samples[start..start + tile_cols]
                        .iter_mut()
                        .zip(tile.row(tile_row))
                    {
                        *dst = src;
                    }
                }
            }
        }

        Self {
            layout,
            rows,
            cols,
            samples,
        }
    }

    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Returns the (rows, columns) of this grid.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Approximate ground distance between adjacent samples.
    ///
    /// Uses a fixed 111 km per degree regardless of latitude.
    pub fn cell_size_m(&self) -> C {
        cell_size_m(self.layout.side())
    }

    /// Returns the elevation at (`row`, `col`).
    ///
    /// `None` when out of bounds or void.
    pub fn get(&self, row: usize, col: usize) -> Option<i16> {
        if row < self.rows && col < self.cols {
            Some(self.samples[row * self.cols + col]).filter(|&s| s != VOID)
        } else {
            None
        }
    }

    /// Returns `true` if (`row`, `col`) lies inside this grid.
    pub fn contains(&self, row: isize, col: isize) -> bool {
        usize::try_from(row).map_or(false, |row| row < self.rows)
            && usize::try_from(col).map_or(false, |col| col < self.cols)
    }

    pub fn coords_to_indices(&self, coord: Coord<C>) -> Result<(usize, usize), TerrainError> {
        self.layout.coords_to_indices(coord)
    }

    pub fn indices_to_coords(&self, idx: (usize, usize)) -> Result<Coord<C>, TerrainError> {
        self.layout.indices_to_coords(idx)
    }

    /// Returns the elevation of the sample covering `coord`.
    pub fn elevation_at(&self, coord: Coord<C>) -> Result<Option<i16>, TerrainError> {
        let (row, col) = self.coords_to_indices(coord)?;
        Ok(self.get(row, col))
    }

    /// Number of non-void samples.
    pub fn valid_len(&self) -> usize {
        self.samples.iter().filter(|&&s| s != VOID).count()
    }
}

/// Ground distance between adjacent samples of a tile with `side`
/// samples per edge.
pub(crate) fn cell_size_m(side: usize) -> C {
    #[allow(clippy::cast_precision_loss)]
    let cells = (side - 1) as C;
    METERS_PER_DEGREE / cells
}
