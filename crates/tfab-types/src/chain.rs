use serde::{Deserialize, Serialize};

use crate::cert::{IssuerCert, LeafCert};
use crate::error::TypeError;
use crate::isd::IsdAs;

/// Paired issuer + leaf certificate bundle authenticating one IA.
///
/// A chain introduces no identity of its own: it is identified by the leaf's
/// `(subject, version)`, and the issuer half is located through the
/// `issuer`/`issuer_version` recorded in the leaf. The issuer's version may
/// differ from the leaf's.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub issuer: IssuerCert,
    pub leaf: LeafCert,
}

impl Chain {
    /// The IA this chain authenticates (the leaf subject).
    pub fn ia(&self) -> IsdAs {
        self.leaf.0.subject
    }

    /// The chain version (the leaf version).
    pub fn version(&self) -> u64 {
        self.leaf.0.version
    }

    /// Decode a chain from its serialized JSON form and validate its
    /// structure.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, TypeError> {
        let chain: Chain =
            serde_json::from_slice(raw).map_err(|e| TypeError::Decode(e.to_string()))?;
        chain.validate()?;
        Ok(chain)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Decode(e.to_string()))
    }

    /// Check structural well-formedness of both halves and that the leaf's
    /// recorded issuer matches the bundled issuer certificate.
    pub fn validate(&self) -> Result<(), TypeError> {
        self.issuer.0.validate()?;
        self.leaf.0.validate()?;
        if self.leaf.0.issuer != self.issuer.0.subject {
            return Err(TypeError::malformed(
                "chain",
                format!(
                    "leaf names issuer {}, bundle carries {}",
                    self.leaf.0.issuer, self.issuer.0.subject
                ),
            ));
        }
        if self.leaf.0.issuer_version != self.issuer.0.version {
            return Err(TypeError::malformed(
                "chain",
                format!(
                    "leaf names issuer version {}, bundle carries {}",
                    self.leaf.0.issuer_version, self.issuer.0.version
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::{Certificate, Validity};

    fn sample_chain() -> Chain {
        let issuer = Certificate {
            subject: "1-ff00:0:310".parse().unwrap(),
            version: 2,
            issuer: "1-ff00:0:310".parse().unwrap(),
            issuer_version: 1,
            validity: Validity {
                not_before: 1_000,
                not_after: 3_000,
            },
            subject_key: vec![0x03; 32],
            signature: vec![0x04; 64],
        };
        let leaf = Certificate {
            subject: "1-ff00:0:311".parse().unwrap(),
            version: 1,
            issuer: issuer.subject,
            issuer_version: issuer.version,
            validity: Validity {
                not_before: 1_000,
                not_after: 2_000,
            },
            subject_key: vec![0x01; 32],
            signature: vec![0x02; 64],
        };
        Chain {
            issuer: IssuerCert(issuer),
            leaf: LeafCert(leaf),
        }
    }

    #[test]
    fn identity_comes_from_leaf() {
        let chain = sample_chain();
        assert_eq!(chain.ia(), "1-ff00:0:311".parse().unwrap());
        assert_eq!(chain.version(), 1);
    }

    #[test]
    fn json_roundtrip() {
        let chain = sample_chain();
        let raw = chain.to_json_bytes().unwrap();
        assert_eq!(Chain::from_json_bytes(&raw).unwrap(), chain);
    }

    #[test]
    fn issuer_version_may_differ_from_leaf_version() {
        let chain = sample_chain();
        assert_ne!(chain.issuer.0.version, chain.leaf.0.version);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn rejects_mismatched_issuer_subject() {
        let mut chain = sample_chain();
        chain.leaf.0.issuer = "1-ff00:0:312".parse().unwrap();
        assert!(chain.validate().is_err());
    }

    #[test]
    fn rejects_mismatched_issuer_version() {
        let mut chain = sample_chain();
        chain.leaf.0.issuer_version = 9;
        assert!(chain.validate().is_err());
    }
}
