use std::io;

use figment::Error as ConfigError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("HTTP Error: {source:#?}")]
    HTTPError {
        #[from]
        source: reqwest::Error,
    },

    #[error("IO Error: {source:#?}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("Configuration Error: {source:#?}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("Unable to deserialize JSON: {source:#?}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },

    /// An error payload returned by the portal's sharing API.
    #[error("Portal Error {code}: {message}")]
    PortalError { code: i64, message: String },

    /// A failed fetch branch. `context` carries the fixed descriptive message
    /// for that branch; the underlying error is kept as the source.
    #[error("{context}")]
    FetchError {
        context: &'static str,
        #[source]
        source: Box<BootstrapError>,
    },

    #[error("Config is not defined")]
    MissingConfig,
}

impl BootstrapError {
    /// Wrap a branch failure with that branch's fixed descriptive message.
    pub fn fetch(context: &'static str, source: impl Into<BootstrapError>) -> Self {
        Self::FetchError {
            context,
            source: Box::new(source.into()),
        }
    }
}
