//! Error types for the transit simulation engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a campaign.
///
/// Only [`Error::Config`] is fatal to a run: a bad quota mode or unreadable
/// configuration stops the simulation before scheduling begins. Fit and
/// propagation failures are caught per target and the campaign continues.
#[derive(Error, Debug)]
pub enum Error {
    /// Period fit cannot be performed: fewer than three usable observations,
    /// or the weighted system is numerically degenerate. Callers treat both
    /// causes identically.
    #[error("insufficient data for period fit ({0} usable observations)")]
    InsufficientData(usize),

    /// Malformed inputs to forward error propagation.
    #[error("error propagation failed: {0}")]
    Propagation(String),

    /// Invalid configuration (bad quota mode, unreadable file).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Target name not present in the store.
    #[error("unknown target: {0}")]
    UnknownTarget(String),

    /// Site name not present in the store.
    #[error("unknown site: {0}")]
    UnknownSite(String),

    /// I/O error (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error while loading site data.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error while loading configuration.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error while writing a state snapshot.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
