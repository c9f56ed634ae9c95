//! Error type for the header-chain engine.

use std::fmt;

/// Everything that can go wrong while decoding, verifying, storing or
/// querying block headers.
#[derive(Debug)]
pub enum ChainError {
    /// A header does not chain onto what its position claims.
    InvalidHeader(String),
    /// A header was asked for (by height or hash) that the engine has not
    /// stored and cannot derive from a checkpoint.
    MissingHeader(String),
    /// A retarget window needed more ancestor headers than are available.
    NotEnoughHeaders(String),
    /// A PoW kernel required to verify a header is not available at runtime.
    KernelUnavailable(String),
    /// The on-disk record layout did not match what was expected.
    Codec(String),
    /// A lower-level file I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
            ChainError::MissingHeader(msg) => write!(f, "missing header: {msg}"),
            ChainError::NotEnoughHeaders(msg) => write!(f, "not enough headers: {msg}"),
            ChainError::KernelUnavailable(msg) => write!(f, "pow kernel unavailable: {msg}"),
            ChainError::Codec(msg) => write!(f, "header codec error: {msg}"),
            ChainError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
