use std::io;

use thiserror::Error;

/// Errors reported by `progline`.
///
/// Drawing itself never fails: write errors on the progress output are
/// discarded. Errors come from configuration and from wrapped streams.
#[derive(Error, Debug)]
pub enum Error {
    /// An environment variable read by [`Config::from_env`](crate::Config::from_env)
    /// holds a value that cannot be parsed.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
