//! Error types for configuration resolution

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while resolving or reading configuration.
///
/// Fatal variants are delivered to [`crate::Handlers::fail`]; [`ConfigError::Read`]
/// is returned directly from [`crate::Settings`] accessors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Flag parsing failed, or the user asked for `--help`.
    #[error("invalid command line: {0}")]
    CommandLine(#[from] clap::Error),

    /// An item's flag could not be found after parsing.
    #[error("could not bind configuration flag {flag} for key {key}")]
    FlagBinding { key: String, flag: String },

    /// A configuration or secrets file exists but could not be decoded.
    #[error("could not read {kind} file {}: {source}", path.display())]
    File {
        kind: &'static str,
        path: PathBuf,
        source: Box<figment::Error>,
    },

    #[error("invalid value for configuration item '{key}': {reason}")]
    Validation { key: String, reason: anyhow::Error },

    /// A resolved value is missing or has the wrong type.
    #[error("configuration item '{key}' could not be read: {source}")]
    Read {
        key: String,
        source: Box<figment::Error>,
    },
}

impl ConfigError {
    /// Key of the configuration item the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::FlagBinding { key, .. } | Self::Validation { key, .. } | Self::Read { key, .. } => {
                Some(key)
            }
            Self::CommandLine(_) | Self::File { .. } => None,
        }
    }
}

/// Returned after the fail handler was invoked and handed control back.
///
/// The error itself went to the handler; nothing past the failure point ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("configuration loading halted after a fatal error")]
pub struct Halted;
