//! SRTM evelation (`.hgt`) file format.
//!
//! # References
//!
//! 1. [30-Meter SRTM Tile Downloader](https://dwtkns.com/srtm30m)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;

pub use crate::error::SrtmError;
use byteorder::{BigEndian as BE, ByteOrder, ReadBytesExt, WriteBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    mem::size_of,
    path::Path,
};

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

/// Raw sample value marking a void (no data).
pub const VOID: i16 = i16::MIN;

/// Samples per side of a 3 arc-second tile.
pub const THREE_ARCSECOND_SIDE: usize = 1201;

/// Samples per side of a 1 arc-second tile.
pub const ONE_ARCSECOND_SIDE: usize = 3601;

/// A square block of elevation samples covering one degree of
/// latitude and longitude.
///
/// Samples are stored row-major, north to south and west to east,
/// exactly as they appear on disk.
pub struct Tile {
    /// Southwest corner of the tile, in whole degrees.
    sw_corner: Coord<i16>,

    /// Number of samples along each side.
    side: usize,

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    Void,
    InMem(Box<[i16]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> i16 {
        match self {
            Self::Void => VOID,
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                let end = start + size_of::<i16>();
                BE::read_i16(&raw.as_ref()[start..end])
            }
        }
    }
}

impl Tile {
    /// Returns a Tile read into memory from the file at `path`.
    ///
    /// The file must hold exactly `side * side` samples.
    pub fn load<P: AsRef<Path>>(path: P, side: usize) -> Result<Self, SrtmError> {
        let path = path.as_ref();
        check_len(path, side)?;
        let sw_corner = parse_sw_corner(path)?;

        let mut file = BufReader::new(File::open(path)?);
        let mut samples = vec![0_i16; side * side];
        file.read_i16_into::<BE>(&mut samples)?;

        Ok(Self {
            sw_corner,
            side,
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Returns a Tile using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P, side: usize) -> Result<Self, SrtmError> {
        let path = path.as_ref();
        check_len(path, side)?;
        let sw_corner = parse_sw_corner(path)?;

        let samples = {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            sw_corner,
            side,
            samples,
        })
    }

    /// Returns a tile where every sample is void.
    ///
    /// Used in place of tiles missing from disk.
    pub fn void(sw_corner: Coord<i16>, side: usize) -> Self {
        Self {
            sw_corner,
            side,
            samples: SampleStore::Void,
        }
    }

    pub fn sw_corner(&self) -> Coord<i16> {
        self.sw_corner
    }

    /// Returns the number of samples along each side of this tile.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.side * self.side
    }

    /// Returns `true` if this tile was synthesized rather than read
    /// from disk.
    pub fn is_void(&self) -> bool {
        matches!(self.samples, SampleStore::Void)
    }

    /// Returns the elevation at (`row`, `col`).
    ///
    /// `None` when the indices fall outside the tile or the sample is
    /// void.
    pub fn get(&self, row: usize, col: usize) -> Option<i16> {
        if row < self.side && col < self.side {
            Some(self.samples.get_unchecked(row * self.side + col)).filter(|&s| s != VOID)
        } else {
            None
        }
    }

    /// Returns an iterator over the raw samples of `row`, west to east.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> impl Iterator<Item = i16> + '_ {
        assert!(row < self.side, "row {row} out of bounds");
        let start = row * self.side;
        (start..start + self.side).map(move |idx| self.samples.get_unchecked(idx))
    }

    /// Returns the lowest non-void elevation sample in this tile.
    pub fn min_elevation(&self) -> Option<i16> {
        self.valid_samples().min()
    }

    /// Returns the highest non-void elevation sample in this tile.
    pub fn max_elevation(&self) -> Option<i16> {
        self.valid_samples().max()
    }

    fn valid_samples(&self) -> impl Iterator<Item = i16> + '_ {
        (0..self.len())
            .map(|idx| self.samples.get_unchecked(idx))
            .filter(|&s| s != VOID)
    }
}

/// Returns the southwest corner as integers for coord.
pub fn sw_corner(Coord { x, y }: Coord<C>) -> Coord<i16> {
    #[allow(clippy::cast_possible_truncation)]
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

/// Returns the expected file name for the tile whose southwest corner
/// is `sw_corner`.
pub fn file_name(Coord { x, y }: Coord<i16>) -> String {
    let (n_s, lat) = {
        let lat = y.unsigned_abs();
        let n_s = if y.is_negative() { 'S' } else { 'N' };
        (n_s, lat)
    };
    let (e_w, lon) = {
        let lon = x.unsigned_abs();
        let e_w = if x.is_negative() { 'W' } else { 'E' };
        (e_w, lon)
    };
    format!("{n_s}{lat:02}{e_w}{lon:03}.hgt")
}

/// Parses the southwest corner out of a tile's file name.
pub fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, SrtmError> {
    let mk_err = || SrtmError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_ascii_uppercase)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" => 1,
        "S" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" => 1,
        "W" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}

/// Writes `samples` to `path` in HGT layout (big-endian, no header).
pub fn write_hgt<P, I>(path: P, samples: I) -> Result<(), SrtmError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = i16>,
{
    let mut file = BufWriter::new(File::create(path)?);
    for sample in samples {
        file.write_i16::<BE>(sample)?;
    }
    file.flush()?;
    Ok(())
}

/// Returns the side length implied by a file of `len` bytes, if it
/// holds a square number of samples.
fn side_from_len(len: u64) -> Option<usize> {
    if len % size_of::<i16>() as u64 != 0 {
        return None;
    }
    let count = len / size_of::<i16>() as u64;
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let side = (count as f64).sqrt().round() as u64;
    if side * side == count {
        usize::try_from(side).ok()
    } else {
        None
    }
}

fn check_len(path: &Path, side: usize) -> Result<(), SrtmError> {
    let len = path.metadata()?.len();
    match side_from_len(len) {
        Some(actual) if actual == side => Ok(()),
        _ => Err(SrtmError::HgtLen(len, path.to_owned())),
    }
}
