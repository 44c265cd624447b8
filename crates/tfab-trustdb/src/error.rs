use std::path::PathBuf;

use thiserror::Error;

use tfab_types::{Isd, IsdAs, TypeError};

/// Errors from trust database operations.
///
/// Absence of an object is never an error; `get_*` operations return
/// `Ok(None)` for missing records. Cancellation and storage failures are
/// always distinguishable from absence.
#[derive(Debug, Error)]
pub enum TrustDbError {
    /// The caller's cancellation signal fired before the operation
    /// committed.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller-supplied deadline passed before the operation committed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The payload failed structural validation; rejected before any
    /// storage access.
    #[error("malformed input: {0}")]
    Malformed(#[from] TypeError),

    /// I/O failure in the underlying medium.
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-internal failure (e.g. a poisoned lock).
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A stored leaf certificate names an issuer half that is missing.
    /// Unreachable through chain inserts; a read that observes it must not
    /// fabricate a partial chain.
    #[error(
        "chain {ia} v{version} references missing issuer certificate {issuer} v{issuer_version}"
    )]
    Inconsistent {
        ia: IsdAs,
        version: u64,
        issuer: IsdAs,
        issuer_version: u64,
    },

    /// No authoritative TRC file was found for the domain at bootstrap.
    #[error("no TRC for ISD {0} in {1:?}")]
    MissingAuthoritativeTrc(Isd, PathBuf),
}

/// Result alias for trust database operations.
pub type TrustDbResult<T> = Result<T, TrustDbError>;
