use std::fmt;
use std::hash::Hash;

/// An object that self-describes its identity within a versioned family.
///
/// Every storable trust object is keyed by `(owner, version)`. The payload
/// is the authoritative source of its own identity: callers never pass an
/// owner or version separately from the object on insert.
pub trait Versioned: Clone + Send + Sync {
    /// Owner identifier for this object family (ISD for TRCs, ISD-AS for
    /// certificates).
    type Owner: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn owner(&self) -> Self::Owner;

    /// The concrete stored version. Strictly positive for valid objects.
    fn version(&self) -> u64;
}
