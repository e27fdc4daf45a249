use srtm::SrtmError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("invalid tile resolution {0}, need at least 2 samples per side")]
    Resolution(usize),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("no height files in {0}")]
    NoTiles(PathBuf),

    #[error("coordinate ({lat}, {lon}) is outside the loaded tiles")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("grid index ({row}, {col}) is outside the loaded tiles")]
    IndexOutOfRange { row: usize, col: usize },

    #[error("{0}")]
    Srtm(#[from] SrtmError),
}
