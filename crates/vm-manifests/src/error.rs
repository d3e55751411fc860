//! Manifest model errors

use thiserror::Error;

/// Errors raised by the manifest model itself
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A resource quantity string could not be parsed
    #[error("Invalid quantity: {0:?}")]
    Quantity(String),
}
