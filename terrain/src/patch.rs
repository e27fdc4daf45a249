use crate::{ElevationGrid, C};

/// A down-sampled window of the elevation grid around a point.
///
/// This is what a renderer turns into a terrain mesh. The window is
/// clamped to the grid, so a patch near an edge is not centered on
/// its point.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainPatch {
    /// Grid (row, column) of the patch's northwest sample.
    pub origin: (usize, usize),

    /// Grid (row, column) the patch was requested around.
    pub center: (usize, usize),

    /// Grid samples skipped between patch samples, plus one.
    pub stride: usize,

    /// Distance between adjacent patch samples (meters).
    pub spacing_m: C,

    /// Number of rows in this patch.
    pub rows: usize,

    /// Number of columns in this patch.
    pub cols: usize,

    samples: Box<[Option<i16>]>,
}

impl TerrainPatch {
    /// Stride keeping a patch of `radius` cells under roughly 4000
    /// samples per side.
    pub fn default_stride(radius: usize) -> usize {
        (radius / 2000).max(1)
    }

    pub(crate) fn extract(
        grid: &ElevationGrid,
        center: (usize, usize),
        radius: usize,
        stride: usize,
    ) -> Self {
        let stride = stride.max(1);
        let (grid_rows, grid_cols) = grid.dimensions();
        let row_range =
            center.0.saturating_sub(radius)..center.0.saturating_add(radius).min(grid_rows);
        let col_range =
            center.1.saturating_sub(radius)..center.1.saturating_add(radius).min(grid_cols);
        let origin = (row_range.start, col_range.start);

        let rows = row_range.clone().step_by(stride).count();
        let cols = col_range.clone().step_by(stride).count();
        let samples = row_range
            .step_by(stride)
            .flat_map(|row| {
                col_range
                    .clone()
                    .step_by(stride)
                    .map(move |col| grid.get(row, col))
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let spacing_m = grid.cell_size_m() * stride as C;

        Self {
            origin,
            center,
            stride,
            spacing_m,
            rows,
            cols,
            samples,
        }
    }

    /// Returns the elevation at patch (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Option<i16> {
        if row < self.rows && col < self.cols {
            self.samples[row * self.cols + col]
        } else {
            None
        }
    }

    /// Returns the grid (row, column) of patch (`row`, `col`).
    pub fn grid_index(&self, row: usize, col: usize) -> (usize, usize) {
        (
            self.origin.0 + row * self.stride,
            self.origin.1 + col * self.stride,
        )
    }

    /// Returns the (east, north) offset in meters of patch (`row`,
    /// `col`) from the center point.
    pub fn offset_m(&self, row: usize, col: usize) -> (C, C) {
        let (grid_row, grid_col) = self.grid_index(row, col);
        #[allow(clippy::cast_precision_loss)]
        let cell = self.spacing_m / self.stride as C;
        #[allow(clippy::cast_precision_loss)]
        let east = (grid_col as C - self.center.1 as C) * cell;
        #[allow(clippy::cast_precision_loss)]
        let north = (self.center.0 as C - grid_row as C) * cell;
        (east, north)
    }

    /// Returns the (row, column, elevation) of the highest sample.
    ///
    /// Ties go to the first sample in row-major order.
    pub fn highest(&self) -> Option<(usize, usize, i16)> {
        self.valid()
            .fold(None, |best, cur| match best {
                Some((_, _, elev)) if elev >= cur.2 => best,
                _ => Some(cur),
            })
    }

    /// Returns the (row, column, elevation) of the lowest sample above
    /// sea level.
    pub fn lowest_above_sea(&self) -> Option<(usize, usize, i16)> {
        self.valid()
            .filter(|&(_, _, elev)| elev > 0)
            .fold(None, |best, cur| match best {
                Some((_, _, elev)) if elev <= cur.2 => best,
                _ => Some(cur),
            })
    }

    /// Iterates over (row, column, elevation) of every non-void sample.
    pub fn valid(&self) -> impl Iterator<Item = (usize, usize, i16)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(idx, sample)| sample.map(|elev| (idx / self.cols, idx % self.cols, elev)))
    }
}
