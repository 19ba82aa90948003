//! Assembly error type.

use rail_core::CoreError;
use rail_net::NetError;
use thiserror::Error;

/// Errors detected while assembling a railway, all fatal before launch.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error("{what} references index {index}, but only {len} exist")]
    Reference {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("train {train} route has {len} junctions, need at least 2")]
    ShortRoute { train: u32, len: usize },

    #[error("train {train} route hops from junction {first} to {second}, but no track connects them")]
    RouteGap { train: u32, first: u32, second: u32 },
}

pub type SimResult<T> = Result<T, SimError>;
