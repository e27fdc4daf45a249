//! SRTM region loader.

use crate::{
    grid::cell_size_m, ElevationGrid, Region, TerrainError, TerrainPatch, TileLayout, C,
};
use geo::geometry::Coord;
use log::{debug, info, log_enabled, warn, Level};
use once_cell::sync::OnceCell;
use srtm::{file_name, Tile, THREE_ARCSECOND_SIDE};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Owner of a stitched elevation grid for one region.
///
/// The grid is built on the first query, or eagerly with
/// [`TerrainStore::load`], and reused until the next `load`.
pub struct TerrainStore {
    /// Directory containing HGT tile files.
    tile_dir: PathBuf,

    /// Candidate tiles.
    region: Region,

    /// Samples per tile side.
    resolution: usize,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,

    grid: OnceCell<ElevationGrid>,
}

impl TerrainStore {
    pub fn builder() -> TerrainStoreBuilder {
        TerrainStoreBuilder {
            tile_dir: None,
            region: Region::default(),
            resolution: THREE_ARCSECOND_SIDE,
            tile_mode: TileMode::InMem,
        }
    }

    /// Scans the region and (re)builds the grid, replacing any grid
    /// loaded before.
    ///
    /// On error the previously loaded grid, if any, is kept.
    pub fn load(&mut self) -> Result<&ElevationGrid, TerrainError> {
        let grid = self.load_region()?;
        self.grid = OnceCell::new();
        Ok(self.grid.get_or_init(|| grid))
    }

    /// Returns `true` once a grid has been built.
    pub fn is_loaded(&self) -> bool {
        self.grid.get().is_some()
    }

    /// Returns the grid, building it first if needed.
    pub fn grid(&self) -> Result<&ElevationGrid, TerrainError> {
        self.grid.get_or_try_init(|| self.load_region())
    }

    pub fn tile_dir(&self) -> &Path {
        &self.tile_dir
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Approximate ground distance between adjacent samples.
    pub fn cell_size_m(&self) -> C {
        cell_size_m(self.resolution)
    }

    /// Returns the (rows, columns) of the grid.
    pub fn dimensions(&self) -> Result<(usize, usize), TerrainError> {
        Ok(self.grid()?.dimensions())
    }

    /// Returns the grid (row, column) of the sample covering `coord`.
    pub fn coords_to_indices(&self, coord: Coord<C>) -> Result<(usize, usize), TerrainError> {
        self.grid()?.coords_to_indices(coord)
    }

    /// Returns the coordinate of the sample at grid (row, column).
    pub fn indices_to_coords(&self, idx: (usize, usize)) -> Result<Coord<C>, TerrainError> {
        self.grid()?.indices_to_coords(idx)
    }

    /// Returns the elevation covering `coord`, or `None` where the
    /// grid has no data.
    pub fn elevation_at(&self, coord: Coord<C>) -> Result<Option<i16>, TerrainError> {
        self.grid()?.elevation_at(coord)
    }

    /// Returns the terrain within `radius_km` of `coord`, keeping
    /// every `stride`th sample along each axis.
    ///
    /// A `stride` of `None` picks one from the radius (see
    /// [`TerrainPatch::default_stride`]).
    pub fn patch(
        &self,
        coord: Coord<C>,
        radius_km: C,
        stride: Option<usize>,
    ) -> Result<TerrainPatch, TerrainError> {
        let grid = self.grid()?;
        let center = grid.coords_to_indices(coord)?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let radius = (radius_km.max(0.0) * 1000.0 / grid.cell_size_m()) as usize;
        let stride = stride.unwrap_or_else(|| TerrainPatch::default_stride(radius));
        Ok(TerrainPatch::extract(grid, center, radius, stride))
    }

    /// Reads a single tile.
    ///
    /// Returns `None` when the file is absent, or unreadable (logged).
    pub fn load_tile<P: AsRef<Path>>(&self, path: P) -> Option<Tile> {
        let path = path.as_ref();
        debug!("loading {path:?}");
        let tile = match self.tile_mode {
            TileMode::InMem => Tile::load(path, self.resolution),
            TileMode::MemMap => Tile::memmap(path, self.resolution),
        };
        match tile {
            Ok(tile) => {
                if log_enabled!(Level::Debug) {
                    debug!(
                        "{path:?} elevation range {:?}..={:?}",
                        tile.min_elevation(),
                        tile.max_elevation()
                    );
                }
                Some(tile)
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!("skipping corrupt tile {path:?}: {e}");
                None
            }
        }
    }
}

/// Private API.
impl TerrainStore {
    fn load_region(&self) -> Result<ElevationGrid, TerrainError> {
        // Fail on a bad directory rather than reporting it as empty.
        std::fs::read_dir(&self.tile_dir)?;

        let present: HashMap<Coord<i16>, PathBuf> = self
            .region
            .origins()
            .filter_map(|sw_corner| self.tile_path(sw_corner).map(|path| (sw_corner, path)))
            .collect();

        if present.is_empty() {
            return Err(TerrainError::NoTiles(self.tile_dir.clone()));
        }
        debug!("found {} tiles in {:?}", present.len(), self.tile_dir);

        let layout = TileLayout::new(
            present.keys().map(|sw_corner| sw_corner.y),
            present.keys().map(|sw_corner| sw_corner.x),
            self.resolution,
        )?;

        let mut loaded = 0_usize;
        let grid = ElevationGrid::assemble(layout, |sw_corner| {
            match present
                .get(&sw_corner)
                .and_then(|path| self.load_tile(path))
            {
                Some(tile) => {
                    loaded += 1;
                    tile
                }
                None => {
                    debug!("loading void tile in lieu of missing tile for {sw_corner:?}");
                    Tile::void(sw_corner, self.resolution)
                }
            }
        });

        if loaded == 0 {
            return Err(TerrainError::NoTiles(self.tile_dir.clone()));
        }

        let (rows, cols) = grid.dimensions();
        let layout = grid.layout();
        info!(
            "loaded {loaded} tiles into {rows}x{cols} grid; lat {:?}, lon {:?}",
            layout.lats(),
            layout.lons()
        );
        Ok(grid)
    }

    /// Returns the path of the tile at `sw_corner`, if present.
    fn tile_path(&self, sw_corner: Coord<i16>) -> Option<PathBuf> {
        let file_name = file_name(sw_corner);
        let lower = file_name.to_lowercase();
        [file_name, lower]
            .into_iter()
            .map(|name| self.tile_dir.join(name))
            .find(|path| path.exists())
    }
}

pub struct TerrainStoreBuilder {
    /// Directory containing HGT tile files (required).
    tile_dir: Option<PathBuf>,

    /// Candidate tiles (defaults to [`Region::ecuador`]).
    region: Region,

    /// Samples per tile side (defaults to 1201).
    resolution: usize,

    /// How to load tiles (defaults to [`TileMode::InMem`]).
    tile_mode: TileMode,
}

impl TerrainStoreBuilder {
    /// Directory containing HGT tile files (required).
    #[must_use]
    pub fn tile_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.tile_dir = Some(dir.into());
        self
    }

    /// Candidate tiles (defaults to [`Region::ecuador`]).
    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Samples per tile side (defaults to 1201).
    #[must_use]
    pub fn resolution(mut self, side: usize) -> Self {
        self.resolution = side;
        self
    }

    /// How to load tiles (defaults to [`TileMode::InMem`]).
    #[must_use]
    pub fn tile_mode(mut self, mode: TileMode) -> Self {
        self.tile_mode = mode;
        self
    }

    /// Returns an unloaded store.
    pub fn build(self) -> Result<TerrainStore, TerrainError> {
        let tile_dir = self.tile_dir.ok_or(TerrainError::Builder("tile_dir"))?;
        if self.resolution < 2 {
            return Err(TerrainError::Resolution(self.resolution));
        }
        Ok(TerrainStore {
            tile_dir,
            region: self.region,
            resolution: self.resolution,
            tile_mode: self.tile_mode,
            grid: OnceCell::new(),
        })
    }
}

/// How to handle tile.
///
/// Tiles are copied into the grid either way; memory mapping only
/// avoids an intermediate buffer per tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    /// Parse tile and load into memory.
    #[default]
    InMem,

    /// Memory map file contents.
    MemMap,
}

#[cfg(test)]
mod tests {
    use super::{Region, TerrainError, TerrainStore, TileMode};
    use crate::test_utils::write_tile;
    use geo::geometry::Coord;
    use std::path::Path;

    const SIDE: usize = 11;

    fn store(dir: &Path, region: Region) -> TerrainStore {
        TerrainStore::builder()
            .tile_dir(dir)
            .region(region)
            .resolution(SIDE)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_tile_dir() {
        assert!(matches!(
            TerrainStore::builder().build(),
            Err(TerrainError::Builder("tile_dir"))
        ));
        assert!(matches!(
            TerrainStore::builder().tile_dir("/tmp").resolution(1).build(),
            Err(TerrainError::Resolution(1))
        ));
    }

    #[test]
    fn test_no_tiles_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path(), Region::ecuador());
        assert!(matches!(store.load(), Err(TerrainError::NoTiles(_))));
        assert!(!store.is_loaded());
        assert!(matches!(
            store.elevation_at(Coord { x: -78.5, y: -0.2 }),
            Err(TerrainError::NoTiles(_))
        ));
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir.path().join("nope"), Region::ecuador());
        assert!(matches!(store.grid(), Err(TerrainError::Io(_))));
    }

    #[test]
    fn test_lazy_load() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |_, _| 2800);
        let store = store(dir.path(), Region::ecuador());
        assert!(!store.is_loaded());
        assert_eq!(
            store.elevation_at(Coord { x: -78.5, y: -0.5 }).unwrap(),
            Some(2800)
        );
        assert!(store.is_loaded());
        assert_eq!(store.dimensions().unwrap(), (SIDE, SIDE));
    }

    #[test]
    fn test_layout_from_present_tiles() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |_, _| 2800);
        write_tile(dir.path(), Coord { x: -80, y: 0 }, SIDE, |_, _| 50);
        let store = store(dir.path(), Region::ecuador());
        let grid = store.grid().unwrap();
        assert_eq!(grid.layout().lats(), &[0, -1]);
        assert_eq!(grid.layout().lons(), &[-80, -79]);
        assert_eq!(grid.dimensions(), (2 * (SIDE - 1) + 1, 2 * (SIDE - 1) + 1));

        // Absent tiles inside the layout are void.
        assert_eq!(store.elevation_at(Coord { x: -78.5, y: 0.5 }).unwrap(), None);
        assert_eq!(store.elevation_at(Coord { x: -79.5, y: -0.5 }).unwrap(), None);
        assert_eq!(store.elevation_at(Coord { x: -79.5, y: 0.5 }).unwrap(), Some(50));
        assert_eq!(
            store.elevation_at(Coord { x: -78.5, y: -0.5 }).unwrap(),
            Some(2800)
        );
    }

    #[test]
    fn test_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |_, _| 2800);
        let store = store(dir.path(), Region::ecuador());
        let one_cell = 1.0 / (SIDE - 1) as f64;
        assert!(matches!(
            store.coords_to_indices(Coord {
                x: -78.5,
                y: 0.0 + one_cell
            }),
            Err(TerrainError::OutOfRange { .. })
        ));
        assert!(matches!(
            store.coords_to_indices(Coord {
                x: -78.0 + one_cell,
                y: -0.5
            }),
            Err(TerrainError::OutOfRange { .. })
        ));
        assert!(matches!(
            store.indices_to_coords((SIDE, 0)),
            Err(TerrainError::IndexOutOfRange { .. })
        ));
        // A failed query leaves the grid in place.
        assert!(store.is_loaded());
    }

    #[test]
    fn test_corrupt_tile_is_void() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |_, _| 2800);
        std::fs::write(dir.path().join("S01W080.hgt"), [0_u8; 3 * 3 * 2]).unwrap();
        let store = store(dir.path(), Region::ecuador());
        let grid = store.grid().unwrap();
        assert_eq!(grid.layout().lons(), &[-80, -79]);
        assert_eq!(store.elevation_at(Coord { x: -79.5, y: -0.5 }).unwrap(), None);
        assert!(store.load_tile(dir.path().join("S01W080.hgt")).is_none());
    }

    #[test]
    fn test_only_corrupt_tiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("S01W080.hgt"), [0_u8; 7]).unwrap();
        let store = store(dir.path(), Region::ecuador());
        assert!(matches!(store.grid(), Err(TerrainError::NoTiles(_))));
    }

    #[test]
    fn test_load_tile_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), Region::ecuador());
        assert!(store.load_tile(dir.path().join("N00W080.hgt")).is_none());
    }

    #[test]
    fn test_lowercase_names_and_memmap() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |row, _| {
            if row == 0 {
                10
            } else {
                20
            }
        });
        std::fs::rename(
            dir.path().join("S01W079.hgt"),
            dir.path().join("s01w079.hgt"),
        )
        .unwrap();
        let store = TerrainStore::builder()
            .tile_dir(dir.path())
            .region(Region::new([-1], [-79]))
            .resolution(SIDE)
            .tile_mode(TileMode::MemMap)
            .build()
            .unwrap();
        assert_eq!(
            store.elevation_at(Coord { x: -78.5, y: -0.05 }).unwrap(),
            Some(10)
        );
        assert_eq!(
            store.elevation_at(Coord { x: -78.5, y: -0.5 }).unwrap(),
            Some(20)
        );
    }

    #[test]
    fn test_reload_replaces_grid() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |_, _| 2800);
        let mut store = store(dir.path(), Region::ecuador());
        assert_eq!(store.load().unwrap().dimensions(), (SIDE, SIDE));

        write_tile(dir.path(), Coord { x: -79, y: -2 }, SIDE, |_, _| 1500);
        assert_eq!(store.dimensions().unwrap(), (SIDE, SIDE));
        assert_eq!(store.load().unwrap().dimensions(), (2 * SIDE - 1, SIDE));
        assert_eq!(
            store.elevation_at(Coord { x: -78.5, y: -1.5 }).unwrap(),
            Some(1500)
        );
    }

    #[test]
    fn test_failed_reload_keeps_grid() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), Coord { x: -79, y: -1 }, SIDE, |_, _| 2800);
        let mut store = store(dir.path(), Region::ecuador());
        store.load().unwrap();
        std::fs::remove_file(dir.path().join("S01W079.hgt")).unwrap();
        assert!(store.load().is_err());
        assert!(store.is_loaded());
        assert_eq!(
            store.elevation_at(Coord { x: -78.5, y: -0.5 }).unwrap(),
            Some(2800)
        );
    }
}
