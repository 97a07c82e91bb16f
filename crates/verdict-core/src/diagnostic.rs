//! Diagnostic data: the immutable snapshot handed to the validation engine
//!
//! The snapshot indexes every token by id and rejects duplicates. It is
//! never mutated during validation; processes only derive conclusions and
//! proofs of existence from it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, VerdictError};
use crate::token::{Certificate, RevocationData, Signature, Timestamp, TokenId};

/// Default bound on the number of certificates walked while building a chain
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 32;

/// Wire shape of the snapshot
#[derive(Debug, Default, Deserialize)]
struct RawDiagnosticData {
    #[serde(default)]
    validation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    certificates: Vec<Certificate>,
    #[serde(default)]
    revocations: Vec<RevocationData>,
    #[serde(default)]
    timestamps: Vec<Timestamp>,
    #[serde(default)]
    signatures: Vec<Signature>,
}

/// Immutable snapshot of certificates, revocation data, timestamps and signatures
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "RawDiagnosticData")]
pub struct DiagnosticData {
    validation_time: Option<DateTime<Utc>>,
    certificates: BTreeMap<TokenId, Certificate>,
    revocations: BTreeMap<TokenId, RevocationData>,
    timestamps: BTreeMap<TokenId, Timestamp>,
    /// Signatures keep document order
    signatures: Vec<Signature>,
}

impl TryFrom<RawDiagnosticData> for DiagnosticData {
    type Error = VerdictError;

    fn try_from(raw: RawDiagnosticData) -> Result<Self> {
        let mut builder = DiagnosticData::builder();
        for certificate in raw.certificates {
            builder = builder.certificate(certificate);
        }
        for revocation in raw.revocations {
            builder = builder.revocation(revocation);
        }
        for timestamp in raw.timestamps {
            builder = builder.timestamp(timestamp);
        }
        for signature in raw.signatures {
            builder = builder.signature(signature);
        }
        if let Some(at) = raw.validation_time {
            builder = builder.validation_time(at);
        }
        builder.build()
    }
}

impl DiagnosticData {
    pub fn builder() -> DiagnosticDataBuilder {
        DiagnosticDataBuilder::default()
    }

    /// Parse a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validation time recorded by the collaborator that assembled the snapshot
    pub fn validation_time(&self) -> Option<DateTime<Utc>> {
        self.validation_time
    }

    pub fn certificate(&self, id: &TokenId) -> Option<&Certificate> {
        self.certificates.get(id)
    }

    pub fn revocation(&self, id: &TokenId) -> Option<&RevocationData> {
        self.revocations.get(id)
    }

    pub fn timestamp(&self, id: &TokenId) -> Option<&Timestamp> {
        self.timestamps.get(id)
    }

    pub fn signature(&self, id: &TokenId) -> Option<&Signature> {
        self.signatures.iter().find(|s| &s.id == id)
    }

    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.values()
    }

    pub fn revocations(&self) -> impl Iterator<Item = &RevocationData> {
        self.revocations.values()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &Timestamp> {
        self.timestamps.values()
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Every token id in the snapshot
    pub fn token_ids(&self) -> impl Iterator<Item = &TokenId> {
        self.certificates
            .keys()
            .chain(self.revocations.keys())
            .chain(self.timestamps.keys())
            .chain(self.signatures.iter().map(|s| &s.id))
    }

    /// Revocation objects referenced by a certificate
    ///
    /// A dangling reference is an error, not an empty result.
    pub fn revocations_for(&self, certificate: &Certificate) -> Result<Vec<&RevocationData>> {
        certificate
            .revocation_ids
            .iter()
            .map(|id| {
                self.revocation(id)
                    .ok_or_else(|| VerdictError::unknown_revocation(id))
            })
            .collect()
    }

    /// Build the prospective certificate chain starting at `leaf_id`
    ///
    /// Walks issuer links until a trusted certificate, a self-signed
    /// certificate, a missing issuer, a repeated certificate or `max_depth`
    /// certificates. Only a chain that ends on a trusted certificate carries
    /// a trust anchor.
    pub fn certificate_chain(&self, leaf_id: &TokenId, max_depth: usize) -> Result<CertificateChain<'_>> {
        let mut current = self
            .certificate(leaf_id)
            .ok_or_else(|| VerdictError::unknown_certificate(leaf_id))?;

        let mut certificates = Vec::new();
        let mut seen = HashSet::new();
        let mut termination = ChainTermination::IssuerNotFound;

        loop {
            if !seen.insert(&current.id) {
                termination = ChainTermination::Cycle;
                break;
            }
            certificates.push(current);

            if current.trusted {
                termination = ChainTermination::TrustAnchor;
                break;
            }
            if current.self_signed {
                termination = ChainTermination::UntrustedSelfSigned;
                break;
            }
            if certificates.len() >= max_depth {
                termination = ChainTermination::DepthExceeded;
                break;
            }

            match current.issuer_id.as_ref().and_then(|id| self.certificate(id)) {
                Some(issuer) => current = issuer,
                None => break,
            }
        }

        Ok(CertificateChain {
            certificates,
            termination,
        })
    }
}

/// Why chain building stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainTermination {
    TrustAnchor,
    UntrustedSelfSigned,
    IssuerNotFound,
    Cycle,
    DepthExceeded,
}

/// Certificates from the leaf towards the trust anchor
#[derive(Debug, Clone)]
pub struct CertificateChain<'a> {
    certificates: Vec<&'a Certificate>,
    termination: ChainTermination,
}

impl<'a> CertificateChain<'a> {
    /// Leaf first
    pub fn certificates(&self) -> &[&'a Certificate] {
        &self.certificates
    }

    pub fn leaf(&self) -> Option<&'a Certificate> {
        self.certificates.first().copied()
    }

    pub fn termination(&self) -> ChainTermination {
        self.termination
    }

    pub fn trust_anchor(&self) -> Option<&'a Certificate> {
        match self.termination {
            ChainTermination::TrustAnchor => self.certificates.last().copied(),
            _ => None,
        }
    }

    /// Certificates that need validating: everything below the trust anchor, leaf first
    pub fn non_anchor(&self) -> &[&'a Certificate] {
        match self.termination {
            ChainTermination::TrustAnchor => &self.certificates[..self.certificates.len() - 1],
            _ => &self.certificates,
        }
    }

    /// The certificate following `index` towards the anchor
    pub fn issuer_of(&self, index: usize) -> Option<&'a Certificate> {
        let certificate = self.certificates.get(index)?;
        if certificate.self_signed {
            return Some(certificate);
        }
        self.certificates
            .get(index + 1)
            .copied()
            .filter(|issuer| certificate.is_issued_by(issuer))
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// Builder for [`DiagnosticData`]
#[derive(Debug, Default)]
pub struct DiagnosticDataBuilder {
    validation_time: Option<DateTime<Utc>>,
    certificates: Vec<Certificate>,
    revocations: Vec<RevocationData>,
    timestamps: Vec<Timestamp>,
    signatures: Vec<Signature>,
}

impl DiagnosticDataBuilder {
    pub fn validation_time(mut self, at: DateTime<Utc>) -> Self {
        self.validation_time = Some(at);
        self
    }

    pub fn certificate(mut self, certificate: Certificate) -> Self {
        self.certificates.push(certificate);
        self
    }

    pub fn revocation(mut self, revocation: RevocationData) -> Self {
        self.revocations.push(revocation);
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamps.push(timestamp);
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn build(self) -> Result<DiagnosticData> {
        let certificates = index("certificate", self.certificates, |c| &c.id)?;
        let revocations = index("revocation", self.revocations, |r| &r.id)?;
        let timestamps = index("timestamp", self.timestamps, |t| &t.id)?;

        let mut seen = HashSet::new();
        for signature in &self.signatures {
            if !seen.insert(&signature.id) {
                return Err(VerdictError::DuplicateToken {
                    kind: "signature",
                    id: signature.id.to_string(),
                });
            }
        }

        Ok(DiagnosticData {
            validation_time: self.validation_time,
            certificates,
            revocations,
            timestamps,
            signatures: self.signatures,
        })
    }
}

fn index<T>(
    kind: &'static str,
    items: Vec<T>,
    id_of: impl Fn(&T) -> &TokenId,
) -> Result<BTreeMap<TokenId, T>> {
    let mut map = BTreeMap::new();
    for item in items {
        let id = id_of(&item).clone();
        if map.contains_key(&id) {
            return Err(VerdictError::DuplicateToken {
                kind,
                id: id.to_string(),
            });
        }
        map.insert(id, item);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap()
    }

    fn cert(id: &str, issuer: &str) -> Certificate {
        Certificate::builder(id)
            .issuer(issuer)
            .validity(date(2020), date(2030))
            .build()
            .unwrap()
    }

    fn root(id: &str) -> Certificate {
        Certificate::builder(id)
            .validity(date(2010), date(2040))
            .self_signed()
            .trusted()
            .ca()
            .build()
            .unwrap()
    }

    #[test]
    fn test_chain_ends_on_trust_anchor() {
        let data = DiagnosticData::builder()
            .certificate(cert("leaf", "ca"))
            .certificate(cert("ca", "root"))
            .certificate(root("root"))
            .build()
            .unwrap();

        let chain = data.certificate_chain(&"leaf".into(), DEFAULT_MAX_CHAIN_DEPTH).unwrap();
        let ids: Vec<_> = chain.certificates().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["leaf", "ca", "root"]);
        assert_eq!(chain.trust_anchor().map(|c| c.id.as_str()), Some("root"));
        assert_eq!(chain.non_anchor().len(), 2);
        assert_eq!(chain.issuer_of(0).map(|c| c.id.as_str()), Some("ca"));
        assert_eq!(chain.issuer_of(2).map(|c| c.id.as_str()), Some("root"));
    }

    #[test]
    fn test_chain_stops_when_issuer_missing() {
        let data = DiagnosticData::builder()
            .certificate(cert("leaf", "nowhere"))
            .build()
            .unwrap();

        let chain = data.certificate_chain(&"leaf".into(), DEFAULT_MAX_CHAIN_DEPTH).unwrap();
        assert_eq!(chain.termination(), ChainTermination::IssuerNotFound);
        assert!(chain.trust_anchor().is_none());
        assert!(chain.issuer_of(0).is_none());
    }

    #[test]
    fn test_chain_detects_cycle() {
        let data = DiagnosticData::builder()
            .certificate(cert("a", "b"))
            .certificate(cert("b", "a"))
            .build()
            .unwrap();

        let chain = data.certificate_chain(&"a".into(), DEFAULT_MAX_CHAIN_DEPTH).unwrap();
        assert_eq!(chain.termination(), ChainTermination::Cycle);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_respects_depth_bound() {
        let mut builder = DiagnosticData::builder();
        for i in 0..10 {
            builder = builder.certificate(cert(&format!("c{}", i), &format!("c{}", i + 1)));
        }
        let data = builder.build().unwrap();

        let chain = data.certificate_chain(&"c0".into(), 4).unwrap();
        assert_eq!(chain.termination(), ChainTermination::DepthExceeded);
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn test_untrusted_self_signed_has_no_anchor() {
        let lonely = Certificate::builder("lonely")
            .validity(date(2020), date(2030))
            .self_signed()
            .build()
            .unwrap();
        let data = DiagnosticData::builder().certificate(lonely).build().unwrap();

        let chain = data.certificate_chain(&"lonely".into(), DEFAULT_MAX_CHAIN_DEPTH).unwrap();
        assert_eq!(chain.termination(), ChainTermination::UntrustedSelfSigned);
        assert!(chain.trust_anchor().is_none());
    }

    #[test]
    fn test_unknown_leaf_is_an_error() {
        let data = DiagnosticData::default();
        let err = data.certificate_chain(&"ghost".into(), DEFAULT_MAX_CHAIN_DEPTH).unwrap_err();
        assert_eq!(err, VerdictError::unknown_certificate("ghost"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = DiagnosticData::builder()
            .certificate(cert("leaf", "ca"))
            .certificate(cert("leaf", "ca"))
            .build()
            .unwrap_err();
        assert!(matches!(err, VerdictError::DuplicateToken { kind: "certificate", .. }));
    }

    #[test]
    fn test_dangling_revocation_reference() {
        let leaf = Certificate::builder("leaf")
            .validity(date(2020), date(2030))
            .revocation("missing-ocsp")
            .build()
            .unwrap();
        let data = DiagnosticData::builder().certificate(leaf.clone()).build().unwrap();

        let err = data.revocations_for(&leaf).unwrap_err();
        assert_eq!(err, VerdictError::unknown_revocation("missing-ocsp"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "validation_time": "2021-06-01T00:00:00Z",
            "certificates": [{
                "id": "root",
                "not_before": "2010-01-01T00:00:00Z",
                "not_after": "2040-01-01T00:00:00Z",
                "self_signed": true,
                "trusted": true,
                "signature": {"digest_algorithm": "SHA256", "encryption_algorithm": "RSA", "key_size": 4096, "intact": true}
            }]
        }"#;

        let data = DiagnosticData::from_json(json).unwrap();
        assert!(data.certificate(&"root".into()).is_some());
        assert_eq!(data.validation_time(), Some(Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let json = r#"{
            "signatures": [
                {"id": "s", "signature": {"digest_algorithm": "SHA256", "encryption_algorithm": "RSA", "key_size": 2048, "intact": true}, "reference_data_found": true, "reference_data_intact": true},
                {"id": "s", "signature": {"digest_algorithm": "SHA256", "encryption_algorithm": "RSA", "key_size": 2048, "intact": true}, "reference_data_found": true, "reference_data_intact": true}
            ]
        }"#;
        assert!(DiagnosticData::from_json(json).is_err());
    }
}
