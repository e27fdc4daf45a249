use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SrtmError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid HGT name {0}")]
    HgtName(PathBuf),

    #[error("invalid HGT file len {0} for {1}")]
    HgtLen(u64, PathBuf),
}

impl SrtmError {
    /// Returns `true` if this error is the result of the tile file
    /// not existing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
