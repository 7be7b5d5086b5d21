//! Error type shared by the decoder, loader and index.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Debug, Error)]
pub enum FleetError {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    #[error("invalid location: lat {lat}, lon {lon} out of range")]
    InvalidLocation { lat: f64, lon: f64 },

    #[error("malformed record: need 30 bytes, got {len}")]
    MalformedRecord { len: usize },

    #[error("truncated file: {trailing} trailing bytes after the last whole record")]
    TruncatedFile { trailing: usize },

    #[error("vehicle {registration:?} has no tracks")]
    NoTracks { registration: String },

    #[error("timestamp precedes the unix epoch")]
    InvalidTimestamp,

    #[error("registration {0:?} does not fit in 10 bytes")]
    InvalidRegistration(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FleetError {
    /// Whether the batch should carry on after this error.
    ///
    /// Only `NoTracks` is skippable; everything else aborts the operation.
    pub fn is_skippable(&self) -> bool {
        matches!(self, FleetError::NoTracks { .. })
    }
}
