use terrain::TerrainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HorizonError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("no elevation data at observer ({lat}, {lon})")]
    NoData { lat: f64, lon: f64 },

    #[error("{0}")]
    Terrain(#[from] TerrainError),
}
