//! Foundation error type.
//!
//! Sub-crates define their own error enums and either wrap `CoreError` as a
//! variant or convert at the boundary; both patterns appear, whichever keeps
//! error sites clean.

use thiserror::Error;

/// Errors produced by `rail-core` validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rail-core`.
pub type CoreResult<T> = Result<T, CoreError>;
