//! Pricer error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur within the pricing registry, its persistence layer
/// or its configuration.
///
/// The first three variants and [`PricerError::Closed`] are contract
/// violations: the caller broke the query-before-trade protocol, passed
/// parameters the pricing function is undefined for, or outlived the service. They are never swallowed by the registry. The
/// remaining variants are recoverable and are logged and skipped by the
/// persistence layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PricerError {
    /// A trade was issued for an item that was never priced.
    #[error("unknown item {key}: trades require a prior price query")]
    UnknownItem {
        /// The item key
        key: String,
    },

    /// A price or trade operation reached an item that is not fully priced.
    #[error("item {key} is {stage}, not priced")]
    NotPriced {
        /// The item key
        key: String,
        /// Lifecycle stage the item was found in
        stage: &'static str,
    },

    /// Base price or spread outside the domain of the pricing function.
    #[error("invalid pricing parameters: {message}")]
    InvalidParameters {
        /// Description of the rejected input
        message: String,
    },

    /// An I/O error on a market-state or configuration file.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The file or directory involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A market-state file did not hold a valid stock value.
    #[error("malformed market-state file {}: {message}", .path.display())]
    Parse {
        /// The offending file
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },

    /// The configuration file could not be decoded.
    #[error("invalid configuration {}: {message}", .path.display())]
    Config {
        /// The configuration file
        path: PathBuf,
        /// Decoder error message
        message: String,
    },

    /// The service was used after it was closed.
    #[error("pricing service is closed")]
    Closed,

    /// A persistence worker thread panicked.
    #[error("persistence worker panicked")]
    WorkerPanicked,
}

impl PricerError {
    /// Returns `true` for errors that indicate a defect in the caller rather
    /// than an environmental failure.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PricerError::UnknownItem { .. }
                | PricerError::NotPriced { .. }
                | PricerError::InvalidParameters { .. }
                | PricerError::Closed
        )
    }

    #[cold]
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PricerError::Io {
            path: path.into(),
            source,
        }
    }
}
