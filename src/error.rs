// error.rs - Crate error type
//
// The simulation never fails. Errors only come from loading configuration
// and from the host failing to hand over a drawing surface.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is outside its accepted range
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Configuration JSON could not be parsed
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host could not provide a drawing surface for a text region
    #[error("no drawing surface for region {region}: {reason}")]
    SurfaceUnavailable { region: usize, reason: String },
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig { field, reason: reason.into() }
    }
}
