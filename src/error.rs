//! Error types for snapkey

use thiserror::Error;

use crate::tier::DifficultyTier;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A tier ended up with no symbols to draw from. Fatal, raised at startup.
    #[error("configuration error: symbol pool for {0} is empty")]
    EmptyPool(DifficultyTier),

    #[error("configuration error: bad symbol pool data: {0}")]
    PoolData(String),

    #[error("store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::EmptyPool(_) | Error::PoolData(_))
    }
}
