use thiserror::Error;

/// Errors from history store operations (used by trait definitions in
/// `mindline-core`).
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors raised while resolving configuration at startup.
///
/// Configuration errors are fatal: the application refuses to process any
/// turn and surfaces the problem instead of proceeding with a broken client.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set or is empty")]
    MissingApiKey(&'static str),
}
