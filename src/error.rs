//! Error types for the advisor library.
//!
//! Boundary code (menu sources, config loading, the binary) works with
//! `anyhow::Result`; the wizard and the advisor surface these typed errors.

use thiserror::Error;

use crate::wizard::Step;

/// Main error type for advisor operations.
#[derive(Error, Debug)]
pub enum SommelierError {
    /// A wizard action that is not valid from the current step.
    #[error("cannot {action} while at step {from:?}")]
    InvalidTransition { from: Step, action: &'static str },

    /// A wine id that is not present in the menu.
    #[error("unknown wine id: {0}")]
    UnknownWine(String),

    /// A food item (by id or name) that is not present in the menu.
    #[error("unknown food item: {0}")]
    UnknownFood(String),

    /// Profile selection with no usable keyword.
    #[error("profile must contain at least one keyword")]
    EmptyProfile,

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors (config files, menu files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for advisor operations.
pub type Result<T> = std::result::Result<T, SommelierError>;
