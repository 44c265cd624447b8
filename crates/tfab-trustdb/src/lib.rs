//! Versioned trust-material database for the TrustFabric control-plane PKI.
//!
//! This crate stores and serves the trust objects routing daemons use to
//! authenticate path information: trust-root configurations (TRCs), issuer
//! and leaf certificates, and the chains that bundle them. Each object
//! family is an independent table keyed by `(owner, version)`.
//!
//! # Contract
//!
//! - Inserts are idempotent: re-inserting an existing `(owner, version)`
//!   returns an affected count of 0, never an error.
//! - Absence is not an error: every `get_*` returns `Ok(None)` (or an empty
//!   vector) when nothing matches.
//! - [`Version::Latest`] resolves to the highest stored version for the
//!   owner, transactionally with respect to concurrent inserts.
//! - A chain is stored as its two certificate halves in one atomic unit; it
//!   has no table of its own.
//! - Every operation takes an [`OpCtx`]; cancellation surfaces as an error
//!   distinct from absence.
//!
//! # Layout
//!
//! - [`traits`] — the [`VersionedStore`] engine interface and the full
//!   [`TrustDb`] surface
//! - [`table`] — the insertion-ordered versioned table engine
//! - [`memory`] — [`InMemoryTrustDb`], the in-memory backend
//! - [`contract`] — the reusable contract test suite, written once against
//!   the traits and runnable against any backend
//! - [`bootstrap`] — loads the authoritative TRC from a local directory at
//!   process start
//!
//! [`Version::Latest`]: tfab_types::Version::Latest

pub mod bootstrap;
pub mod contract;
pub mod ctx;
pub mod error;
pub mod memory;
pub mod table;
pub mod traits;

pub use ctx::OpCtx;
pub use error::{TrustDbError, TrustDbResult};
pub use memory::InMemoryTrustDb;
pub use table::VersionedTable;
pub use traits::{TrustDb, VersionedStore};
