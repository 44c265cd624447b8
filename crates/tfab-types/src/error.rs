use thiserror::Error;

/// Errors produced by type parsing and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid ISD identifier: {0}")]
    InvalidIsd(String),

    #[error("invalid AS identifier: {0}")]
    InvalidAs(String),

    #[error("invalid ISD-AS string: {0}")]
    InvalidIsdAs(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("malformed {object}: {reason}")]
    Malformed {
        object: &'static str,
        reason: String,
    },

    #[error("decode error: {0}")]
    Decode(String),
}

impl TypeError {
    pub(crate) fn malformed(object: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            object,
            reason: reason.into(),
        }
    }
}
