use serde::{Deserialize, Serialize};

use crate::cert::Validity;
use crate::error::TypeError;
use crate::isd::{Isd, IsdAs};
use crate::versioned::Versioned;

/// Trust Root Configuration: the signed trust anchor for one routing domain
/// at one version.
///
/// A TRC is immutable once stored; later versions are separate records. This
/// type is the structural form only — signature bytes are carried opaquely
/// and verified by a different layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trc {
    pub isd: Isd,
    pub version: u64,
    pub description: String,
    pub validity: Validity,
    /// The core ASes of the domain, entitled to sign the next TRC version.
    pub core_ases: Vec<IsdAs>,
    /// Opaque detached signature over the TRC body.
    pub signature: Vec<u8>,
}

impl Trc {
    /// Decode a TRC from its serialized JSON form and validate its structure.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, TypeError> {
        let trc: Trc =
            serde_json::from_slice(raw).map_err(|e| TypeError::Decode(e.to_string()))?;
        trc.validate()?;
        Ok(trc)
    }

    /// Serialize to the canonical JSON form.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Decode(e.to_string()))
    }

    /// Check structural well-formedness. Does not verify signatures.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.version == 0 {
            return Err(TypeError::malformed("TRC", "version must be positive"));
        }
        if self.core_ases.is_empty() {
            return Err(TypeError::malformed("TRC", "no core ASes"));
        }
        if self.core_ases.iter().any(|ia| ia.isd != self.isd) {
            return Err(TypeError::malformed("TRC", "core AS outside own ISD"));
        }
        if self.signature.is_empty() {
            return Err(TypeError::malformed("TRC", "missing signature"));
        }
        self.validity.validate("TRC")?;
        Ok(())
    }
}

impl Versioned for Trc {
    type Owner = Isd;

    fn owner(&self) -> Isd {
        self.isd
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trc() -> Trc {
        Trc {
            isd: Isd(1),
            version: 1,
            description: "ISD 1 root".to_string(),
            validity: Validity {
                not_before: 1_000,
                not_after: 2_000,
            },
            core_ases: vec!["1-ff00:0:110".parse().unwrap()],
            signature: vec![0xaa; 64],
        }
    }

    #[test]
    fn json_roundtrip() {
        let trc = sample_trc();
        let raw = trc.to_json_bytes().unwrap();
        let parsed = Trc::from_json_bytes(&raw).unwrap();
        assert_eq!(parsed, trc);
    }

    #[test]
    fn rejects_version_zero() {
        let mut trc = sample_trc();
        trc.version = 0;
        assert!(trc.validate().is_err());
    }

    #[test]
    fn rejects_empty_core_ases() {
        let mut trc = sample_trc();
        trc.core_ases.clear();
        assert!(trc.validate().is_err());
    }

    #[test]
    fn rejects_foreign_core_as() {
        let mut trc = sample_trc();
        trc.core_ases.push("2-ff00:0:210".parse().unwrap());
        assert!(trc.validate().is_err());
    }

    #[test]
    fn rejects_missing_signature() {
        let mut trc = sample_trc();
        trc.signature.clear();
        assert!(trc.validate().is_err());
    }

    #[test]
    fn owner_and_version_come_from_payload() {
        let trc = sample_trc();
        assert_eq!(trc.owner(), Isd(1));
        assert_eq!(Versioned::version(&trc), 1);
    }
}
