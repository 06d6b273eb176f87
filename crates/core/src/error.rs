//! Shared error type
//!
//! Each crate defines its own error enum and converts into this one at the
//! boundaries where layering requires a common type.

use thiserror::Error;

/// Pipeline-wide error
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
