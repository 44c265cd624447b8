//! Foundation types for the TrustFabric control-plane PKI.
//!
//! This crate provides the identifier, version, and trust-object types used
//! throughout the system. Every other TrustFabric crate depends on
//! `tfab-types`.
//!
//! # Key Types
//!
//! - [`Isd`] — numeric routing-domain identifier
//! - [`IsdAs`] — combined domain + address identifier (`1-ff00:0:311`)
//! - [`Version`] — query-time version selector with a distinguished
//!   [`Version::Latest`] variant
//! - [`Trc`] — trust-root configuration for one domain at one version
//! - [`Certificate`] — signed certificate body shared by both roles
//! - [`IssuerCert`] / [`LeafCert`] — role markers; the two roles never share
//!   a version space
//! - [`Chain`] — paired issuer + leaf bundle authenticating one IA
//!
//! Parsing here is structural only: it checks that an object is well-formed
//! and self-describes its identity. Cryptographic verification is a
//! different layer's job.

pub mod cert;
pub mod chain;
pub mod error;
pub mod isd;
pub mod trc;
pub mod version;
pub mod versioned;

pub use cert::{Certificate, IssuerCert, LeafCert, Validity};
pub use chain::Chain;
pub use error::TypeError;
pub use isd::{Isd, IsdAs};
pub use trc::Trc;
pub use version::Version;
pub use versioned::Versioned;
