use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::isd::IsdAs;
use crate::versioned::Versioned;

/// Validity window of a trust object, in seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    pub not_before: u64,
    pub not_after: u64,
}

impl Validity {
    pub(crate) fn validate(&self, object: &'static str) -> Result<(), TypeError> {
        if self.not_after <= self.not_before {
            return Err(TypeError::malformed(object, "empty validity window"));
        }
        Ok(())
    }
}

/// Signed certificate body, shared by the issuer and leaf roles.
///
/// `issuer`/`issuer_version` name the signing credential: the domain TRC for
/// issuer certificates, the issuer certificate for leaf certificates. The
/// issuer version may differ from the certificate's own version; chain
/// reconstruction relies on the leaf recording both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub subject: IsdAs,
    pub version: u64,
    pub issuer: IsdAs,
    pub issuer_version: u64,
    pub validity: Validity,
    /// Opaque subject public key.
    pub subject_key: Vec<u8>,
    /// Opaque signature by the issuing credential.
    pub signature: Vec<u8>,
}

impl Certificate {
    /// Decode a certificate from its serialized JSON form and validate its
    /// structure.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, TypeError> {
        let cert: Certificate =
            serde_json::from_slice(raw).map_err(|e| TypeError::Decode(e.to_string()))?;
        cert.validate()?;
        Ok(cert)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Decode(e.to_string()))
    }

    /// Check structural well-formedness. Does not verify signatures.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.version == 0 {
            return Err(TypeError::malformed(
                "certificate",
                "version must be positive",
            ));
        }
        if self.issuer_version == 0 {
            return Err(TypeError::malformed(
                "certificate",
                "issuer version must be positive",
            ));
        }
        if self.subject_key.is_empty() {
            return Err(TypeError::malformed("certificate", "missing subject key"));
        }
        if self.signature.is_empty() {
            return Err(TypeError::malformed("certificate", "missing signature"));
        }
        self.validity.validate("certificate")?;
        Ok(())
    }
}

/// A certificate in the issuer role: signed by the domain TRC, entitled to
/// sign leaf certificates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuerCert(pub Certificate);

/// A certificate in the leaf role: signed by an issuer certificate,
/// authenticating one IA directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafCert(pub Certificate);

impl Versioned for IssuerCert {
    type Owner = IsdAs;

    fn owner(&self) -> IsdAs {
        self.0.subject
    }

    fn version(&self) -> u64 {
        self.0.version
    }
}

impl Versioned for LeafCert {
    type Owner = IsdAs;

    fn owner(&self) -> IsdAs {
        self.0.subject
    }

    fn version(&self) -> u64 {
        self.0.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cert() -> Certificate {
        Certificate {
            subject: "1-ff00:0:311".parse().unwrap(),
            version: 1,
            issuer: "1-ff00:0:310".parse().unwrap(),
            issuer_version: 1,
            validity: Validity {
                not_before: 1_000,
                not_after: 2_000,
            },
            subject_key: vec![0x01; 32],
            signature: vec![0x02; 64],
        }
    }

    #[test]
    fn json_roundtrip() {
        let cert = sample_cert();
        let raw = cert.to_json_bytes().unwrap();
        assert_eq!(Certificate::from_json_bytes(&raw).unwrap(), cert);
    }

    #[test]
    fn rejects_version_zero() {
        let mut cert = sample_cert();
        cert.version = 0;
        assert!(cert.validate().is_err());
    }

    #[test]
    fn rejects_issuer_version_zero() {
        let mut cert = sample_cert();
        cert.issuer_version = 0;
        assert!(cert.validate().is_err());
    }

    #[test]
    fn rejects_empty_key_or_signature() {
        let mut cert = sample_cert();
        cert.subject_key.clear();
        assert!(cert.validate().is_err());

        let mut cert = sample_cert();
        cert.signature.clear();
        assert!(cert.validate().is_err());
    }

    #[test]
    fn rejects_empty_validity_window() {
        let mut cert = sample_cert();
        cert.validity.not_after = cert.validity.not_before;
        assert!(cert.validate().is_err());
    }

    #[test]
    fn role_markers_expose_leaf_identity() {
        let cert = sample_cert();
        let leaf = LeafCert(cert.clone());
        assert_eq!(leaf.owner(), cert.subject);
        assert_eq!(Versioned::version(&leaf), 1);
    }
}
