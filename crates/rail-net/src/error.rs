//! Network-assembly error type.

use thiserror::Error;

/// Errors produced while building a [`Network`][crate::Network].
#[derive(Debug, Error)]
pub enum NetError {
    #[error("{what} references index {index}, but only {len} exist")]
    Reference {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

pub type NetResult<T> = Result<T, NetError>;
