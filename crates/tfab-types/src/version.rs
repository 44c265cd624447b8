use std::fmt;

use serde::{Deserialize, Serialize};

/// Query-time version selector.
///
/// Stored objects always carry a concrete, strictly positive version number.
/// Queries additionally accept [`Version::Latest`], which resolves to the
/// highest stored version for the owner at lookup time. `Latest` is a
/// distinguished variant rather than a reserved integer, so it can never
/// collide with a real version.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// Resolve to the highest stored version for the owner.
    Latest,
    /// An exact version number.
    At(u64),
}

impl Version {
    pub fn is_latest(self) -> bool {
        matches!(self, Version::Latest)
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Version::At(v)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Latest => write!(f, "Version::Latest"),
            Version::At(v) => write!(f, "Version::At({v})"),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Latest => write!(f, "latest"),
            Version::At(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u64_is_exact() {
        assert_eq!(Version::from(7), Version::At(7));
        assert!(!Version::from(7).is_latest());
    }

    #[test]
    fn latest_is_latest() {
        assert!(Version::Latest.is_latest());
    }

    #[test]
    fn display() {
        assert_eq!(Version::Latest.to_string(), "latest");
        assert_eq!(Version::At(3).to_string(), "3");
    }
}
