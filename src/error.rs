use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Side;

// Unified error type for jacobi-ode. Every variant is fatal for the run;
// nothing in the crate retries.

#[derive(Error, Debug)]
pub enum OdeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{side} exchange failed at rank {rank} with peer {peer}: {reason}")]
    Exchange {
        side: Side,
        rank: usize,
        peer: usize,
        reason: String,
    },
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid solver state: {0}")]
    InvalidState(&'static str),
}

impl OdeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OdeError::Io { path: path.into(), source }
    }
}
