//! Tokens consumed by the validation processes
//!
//! All tokens are immutable inputs assembled upstream (container parsing,
//! revocation fetching and cryptographic verification happen elsewhere).
//! Cryptographic results reach the engine as pre-computed booleans.
//!
//! ## Token kinds
//!
//! - **Certificate**: X.509 certificate with validity interval and revocation references
//! - **RevocationData**: CRL or OCSP response carrying per-certificate status entries
//! - **Timestamp**: RFC 3161 token providing proof of existence for covered objects
//! - **Signature**: the signature under validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VerdictError};
use crate::types::{
    DigestAlgorithm, EncryptionAlgorithm, ExtendedKeyUsage, KeyUsage, RevocationKind,
    RevocationReason, TimestampType,
};

/// Opaque token identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TokenId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Algorithms and outcome of a token's own signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub digest_algorithm: DigestAlgorithm,

    pub encryption_algorithm: EncryptionAlgorithm,

    /// Size in bits of the key that produced the signature
    pub key_size: u32,

    /// Whether the signature value verifies against the signer's public key
    pub intact: bool,
}

impl SignatureInfo {
    pub fn new(digest: DigestAlgorithm, encryption: EncryptionAlgorithm, key_size: u32) -> Self {
        Self {
            digest_algorithm: digest,
            encryption_algorithm: encryption,
            key_size,
            intact: true,
        }
    }

    /// Mark the signature value as broken
    pub fn broken(mut self) -> Self {
        self.intact = false;
        self
    }
}

impl Default for SignatureInfo {
    /// sha256WithRSAEncryption, 2048-bit key
    fn default() -> Self {
        Self::new(DigestAlgorithm::Sha256, EncryptionAlgorithm::Rsa, 2048)
    }
}

impl fmt::Display for SignatureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}/{}",
            self.digest_algorithm, self.encryption_algorithm, self.key_size
        )
    }
}

// =============================================================================
// Certificate
// =============================================================================

/// X.509 certificate as seen by the validation processes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: TokenId,

    #[serde(default)]
    pub subject: String,

    /// Resolved issuer certificate, if locatable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<TokenId>,

    pub not_before: DateTime<Utc>,

    pub not_after: DateTime<Utc>,

    #[serde(default)]
    pub key_usages: Vec<KeyUsage>,

    #[serde(default)]
    pub extended_key_usages: Vec<ExtendedKeyUsage>,

    /// basicConstraints cA flag
    #[serde(default)]
    pub ca: bool,

    #[serde(default)]
    pub self_signed: bool,

    /// A priori trusted (trust anchor)
    #[serde(default)]
    pub trusted: bool,

    /// Date after which the trust anchor is no longer trusted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_sunset_date: Option<DateTime<Utc>>,

    /// id-pkix-ocsp-nocheck extension present
    #[serde(default)]
    pub ocsp_no_check: bool,

    pub signature: SignatureInfo,

    /// Revocation objects collected for this certificate
    #[serde(default)]
    pub revocation_ids: Vec<TokenId>,
}

impl Certificate {
    /// Start building a certificate
    pub fn builder(id: impl Into<TokenId>) -> CertificateBuilder {
        CertificateBuilder::new(id)
    }

    /// `not_before <= at < not_after`
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at < self.not_after
    }

    pub fn has_key_usage(&self, usage: KeyUsage) -> bool {
        self.key_usages.contains(&usage)
    }

    pub fn has_extended_key_usage(&self, usage: ExtendedKeyUsage) -> bool {
        self.extended_key_usages.contains(&usage)
    }

    /// Whether `issuer` is recorded as this certificate's issuer
    pub fn is_issued_by(&self, issuer: &Certificate) -> bool {
        self.issuer_id.as_ref() == Some(&issuer.id)
    }

    /// Revocation checking does not apply to this certificate
    pub fn is_revocation_exempt(&self) -> bool {
        self.trusted || self.self_signed || self.ocsp_no_check
    }
}

/// Builder for [`Certificate`]
#[derive(Debug, Clone)]
pub struct CertificateBuilder {
    id: TokenId,
    subject: Option<String>,
    issuer_id: Option<TokenId>,
    not_before: Option<DateTime<Utc>>,
    not_after: Option<DateTime<Utc>>,
    key_usages: Vec<KeyUsage>,
    extended_key_usages: Vec<ExtendedKeyUsage>,
    ca: bool,
    self_signed: bool,
    trusted: bool,
    trust_sunset_date: Option<DateTime<Utc>>,
    ocsp_no_check: bool,
    signature: SignatureInfo,
    revocation_ids: Vec<TokenId>,
}

impl CertificateBuilder {
    pub fn new(id: impl Into<TokenId>) -> Self {
        Self {
            id: id.into(),
            subject: None,
            issuer_id: None,
            not_before: None,
            not_after: None,
            key_usages: Vec::new(),
            extended_key_usages: Vec::new(),
            ca: false,
            self_signed: false,
            trusted: false,
            trust_sunset_date: None,
            ocsp_no_check: false,
            signature: SignatureInfo::default(),
            revocation_ids: Vec::new(),
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn issuer(mut self, issuer_id: impl Into<TokenId>) -> Self {
        self.issuer_id = Some(issuer_id.into());
        self
    }

    /// Set the validity interval `[not_before, not_after)`
    pub fn validity(mut self, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self.not_after = Some(not_after);
        self
    }

    pub fn key_usage(mut self, usage: KeyUsage) -> Self {
        self.key_usages.push(usage);
        self
    }

    pub fn extended_key_usage(mut self, usage: ExtendedKeyUsage) -> Self {
        self.extended_key_usages.push(usage);
        self
    }

    /// Mark as CA: sets the cA flag and keyCertSign / cRLSign
    pub fn ca(mut self) -> Self {
        self.ca = true;
        self.key_usages.push(KeyUsage::KeyCertSign);
        self.key_usages.push(KeyUsage::CrlSign);
        self
    }

    /// Self-signed: the issuer is the certificate itself
    pub fn self_signed(mut self) -> Self {
        self.self_signed = true;
        self.issuer_id = Some(self.id.clone());
        self
    }

    pub fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    pub fn trust_sunset_date(mut self, date: DateTime<Utc>) -> Self {
        self.trust_sunset_date = Some(date);
        self
    }

    pub fn ocsp_no_check(mut self) -> Self {
        self.ocsp_no_check = true;
        self
    }

    pub fn signature(mut self, signature: SignatureInfo) -> Self {
        self.signature = signature;
        self
    }

    pub fn revocation(mut self, revocation_id: impl Into<TokenId>) -> Self {
        self.revocation_ids.push(revocation_id.into());
        self
    }

    pub fn build(self) -> Result<Certificate> {
        let not_before = self
            .not_before
            .ok_or(VerdictError::MissingField("not_before".into()))?;
        let not_after = self
            .not_after
            .ok_or(VerdictError::MissingField("not_after".into()))?;

        if not_after < not_before {
            return Err(VerdictError::InvalidValidityRange {
                id: self.id.to_string(),
                not_before: not_before.to_rfc3339(),
                not_after: not_after.to_rfc3339(),
            });
        }

        Ok(Certificate {
            subject: self.subject.unwrap_or_else(|| format!("CN={}", self.id)),
            id: self.id,
            issuer_id: self.issuer_id,
            not_before,
            not_after,
            key_usages: self.key_usages,
            extended_key_usages: self.extended_key_usages,
            ca: self.ca,
            self_signed: self.self_signed,
            trusted: self.trusted,
            trust_sunset_date: self.trust_sunset_date,
            ocsp_no_check: self.ocsp_no_check,
            signature: self.signature,
            revocation_ids: self.revocation_ids,
        })
    }
}

// =============================================================================
// Revocation data
// =============================================================================

/// Status of one certificate inside a revocation object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CertificateStatus {
    Good,
    Revoked {
        revoked_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<RevocationReason>,
    },
    Unknown,
}

impl CertificateStatus {
    /// Suspended rather than revoked
    pub fn is_on_hold(&self) -> bool {
        matches!(
            self,
            CertificateStatus::Revoked {
                reason: Some(RevocationReason::CertificateHold),
                ..
            }
        )
    }
}

/// One status entry of a CRL or OCSP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    pub certificate_id: TokenId,

    #[serde(flatten)]
    pub status: CertificateStatus,
}

/// A CRL or OCSP response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevocationData {
    pub id: TokenId,

    pub kind: RevocationKind,

    /// CRL issuer or OCSP responder certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_id: Option<TokenId>,

    /// `producedAt` for OCSP, `thisUpdate` for CRLs
    pub production_date: DateTime<Utc>,

    pub this_update: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_update: Option<DateTime<Utc>>,

    pub signature: SignatureInfo,

    /// CRL `expiredCertsOnCRL`: expired certificates revoked after this date stay listed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_certs_on_crl: Option<DateTime<Utc>>,

    /// OCSP `archiveCutoff`: status is kept for certificates expired after this date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_cutoff: Option<DateTime<Utc>>,

    /// OCSP `certHash` extension present and matching the certificate
    #[serde(default)]
    pub cert_hash_match: bool,

    #[serde(default)]
    pub entries: Vec<RevocationEntry>,
}

impl RevocationData {
    /// Start building an OCSP response
    pub fn ocsp(id: impl Into<TokenId>) -> RevocationBuilder {
        RevocationBuilder::new(id, RevocationKind::Ocsp)
    }

    /// Start building a CRL
    pub fn crl(id: impl Into<TokenId>) -> RevocationBuilder {
        RevocationBuilder::new(id, RevocationKind::Crl)
    }

    /// Status recorded for a certificate, if any
    pub fn status_of(&self, certificate_id: &TokenId) -> Option<&CertificateStatus> {
        self.entries
            .iter()
            .find(|e| &e.certificate_id == certificate_id)
            .map(|e| &e.status)
    }

    /// Whether the object carries a definite (good or revoked) status for a certificate
    pub fn covers(&self, certificate_id: &TokenId) -> bool {
        matches!(
            self.status_of(certificate_id),
            Some(CertificateStatus::Good) | Some(CertificateStatus::Revoked { .. })
        )
    }

    /// Revocation date of a certificate; suspensions are not revocations
    pub fn revocation_time(&self, certificate_id: &TokenId) -> Option<DateTime<Utc>> {
        match self.status_of(certificate_id) {
            Some(CertificateStatus::Revoked { revoked_at, reason })
                if *reason != Some(RevocationReason::CertificateHold) =>
            {
                Some(*revoked_at)
            }
            _ => None,
        }
    }

    /// Whether a certificate is suspended (certificateHold)
    pub fn is_on_hold(&self, certificate_id: &TokenId) -> bool {
        self.status_of(certificate_id)
            .map_or(false, CertificateStatus::is_on_hold)
    }

    pub fn is_good(&self, certificate_id: &TokenId) -> bool {
        matches!(self.status_of(certificate_id), Some(CertificateStatus::Good))
    }

    /// Suspension date of a certificate
    pub fn hold_time(&self, certificate_id: &TokenId) -> Option<DateTime<Utc>> {
        match self.status_of(certificate_id) {
            Some(CertificateStatus::Revoked {
                revoked_at,
                reason: Some(RevocationReason::CertificateHold),
            }) => Some(*revoked_at),
            _ => None,
        }
    }

    /// Earliest expiry a certificate may have and still be reported on
    ///
    /// Issuers drop expired certificates from their records, so an object
    /// only speaks for certificates expired no earlier than `thisUpdate`,
    /// unless `expiredCertsOnCRL` or `archiveCutoff` move that limit back.
    pub fn expired_certificates_limit(&self) -> DateTime<Utc> {
        [self.expired_certs_on_crl, self.archive_cutoff]
            .into_iter()
            .flatten()
            .fold(self.this_update, |limit, at| limit.min(at))
    }

    /// Whether the issuer still kept information about `certificate`
    pub fn knows_certificate(&self, certificate: &Certificate) -> bool {
        self.cert_hash_match || certificate.not_after >= self.expired_certificates_limit()
    }
}

/// Builder for [`RevocationData`]
#[derive(Debug, Clone)]
pub struct RevocationBuilder {
    id: TokenId,
    kind: RevocationKind,
    signer_id: Option<TokenId>,
    production_date: Option<DateTime<Utc>>,
    this_update: Option<DateTime<Utc>>,
    next_update: Option<DateTime<Utc>>,
    signature: SignatureInfo,
    expired_certs_on_crl: Option<DateTime<Utc>>,
    archive_cutoff: Option<DateTime<Utc>>,
    cert_hash_match: bool,
    entries: Vec<RevocationEntry>,
}

impl RevocationBuilder {
    pub fn new(id: impl Into<TokenId>, kind: RevocationKind) -> Self {
        Self {
            id: id.into(),
            kind,
            signer_id: None,
            production_date: None,
            this_update: None,
            next_update: None,
            signature: SignatureInfo::default(),
            expired_certs_on_crl: None,
            archive_cutoff: None,
            cert_hash_match: false,
            entries: Vec::new(),
        }
    }

    pub fn signer(mut self, signer_id: impl Into<TokenId>) -> Self {
        self.signer_id = Some(signer_id.into());
        self
    }

    /// OCSP `producedAt`; ignored for CRLs
    pub fn produced_at(mut self, at: DateTime<Utc>) -> Self {
        self.production_date = Some(at);
        self
    }

    pub fn this_update(mut self, at: DateTime<Utc>) -> Self {
        self.this_update = Some(at);
        self
    }

    pub fn next_update(mut self, at: DateTime<Utc>) -> Self {
        self.next_update = Some(at);
        self
    }

    pub fn signature(mut self, signature: SignatureInfo) -> Self {
        self.signature = signature;
        self
    }

    pub fn expired_certs_on_crl(mut self, at: DateTime<Utc>) -> Self {
        self.expired_certs_on_crl = Some(at);
        self
    }

    pub fn archive_cutoff(mut self, at: DateTime<Utc>) -> Self {
        self.archive_cutoff = Some(at);
        self
    }

    pub fn cert_hash_match(mut self, matches: bool) -> Self {
        self.cert_hash_match = matches;
        self
    }

    pub fn good(mut self, certificate_id: impl Into<TokenId>) -> Self {
        self.entries.push(RevocationEntry {
            certificate_id: certificate_id.into(),
            status: CertificateStatus::Good,
        });
        self
    }

    pub fn revoked(
        mut self,
        certificate_id: impl Into<TokenId>,
        revoked_at: DateTime<Utc>,
        reason: Option<RevocationReason>,
    ) -> Self {
        self.entries.push(RevocationEntry {
            certificate_id: certificate_id.into(),
            status: CertificateStatus::Revoked { revoked_at, reason },
        });
        self
    }

    pub fn unknown(mut self, certificate_id: impl Into<TokenId>) -> Self {
        self.entries.push(RevocationEntry {
            certificate_id: certificate_id.into(),
            status: CertificateStatus::Unknown,
        });
        self
    }

    pub fn build(self) -> Result<RevocationData> {
        let (production_date, this_update) = match self.kind {
            RevocationKind::Crl => {
                let this_update = self
                    .this_update
                    .ok_or(VerdictError::MissingField("this_update".into()))?;
                (this_update, this_update)
            }
            RevocationKind::Ocsp => {
                let produced = self
                    .production_date
                    .or(self.this_update)
                    .ok_or(VerdictError::MissingField("production_date".into()))?;
                (produced, self.this_update.unwrap_or(produced))
            }
        };

        Ok(RevocationData {
            id: self.id,
            kind: self.kind,
            signer_id: self.signer_id,
            production_date,
            this_update,
            next_update: self.next_update,
            signature: self.signature,
            expired_certs_on_crl: self.expired_certs_on_crl,
            archive_cutoff: self.archive_cutoff,
            cert_hash_match: self.cert_hash_match,
            entries: self.entries,
        })
    }
}

// =============================================================================
// Timestamps and signatures
// =============================================================================

/// Common view over tokens validated by the basic validation process
pub trait SignedToken {
    fn id(&self) -> &TokenId;

    /// Certificate identified as the signer, if any
    fn signing_certificate_id(&self) -> Option<&TokenId>;

    fn signature(&self) -> &SignatureInfo;

    /// Signed data (or message imprint) could be located
    fn reference_data_found(&self) -> bool;

    /// Signed data digest (or message imprint) matches
    fn reference_data_intact(&self) -> bool;

    /// The signing-certificate reference digest matches the identified certificate
    fn signing_certificate_digest_match(&self) -> bool {
        true
    }

    /// Claimed signing time, for tokens that carry one as an attribute
    fn claimed_signing_time(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// RFC 3161 timestamp token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub id: TokenId,

    #[serde(rename = "type")]
    pub timestamp_type: TimestampType,

    pub production_time: DateTime<Utc>,

    /// TSA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_certificate_id: Option<TokenId>,

    pub signature: SignatureInfo,

    /// Message imprint matches the timestamped data
    pub message_imprint_intact: bool,

    /// Objects covered by this timestamp
    #[serde(default)]
    pub covered: Vec<TokenId>,
}

impl Timestamp {
    pub fn builder(id: impl Into<TokenId>, timestamp_type: TimestampType) -> TimestampBuilder {
        TimestampBuilder::new(id, timestamp_type)
    }
}

impl SignedToken for Timestamp {
    fn id(&self) -> &TokenId {
        &self.id
    }

    fn signing_certificate_id(&self) -> Option<&TokenId> {
        self.signing_certificate_id.as_ref()
    }

    fn signature(&self) -> &SignatureInfo {
        &self.signature
    }

    fn reference_data_found(&self) -> bool {
        true
    }

    fn reference_data_intact(&self) -> bool {
        self.message_imprint_intact
    }
}

/// Builder for [`Timestamp`]
#[derive(Debug, Clone)]
pub struct TimestampBuilder {
    id: TokenId,
    timestamp_type: TimestampType,
    production_time: Option<DateTime<Utc>>,
    signing_certificate_id: Option<TokenId>,
    signature: SignatureInfo,
    message_imprint_intact: bool,
    covered: Vec<TokenId>,
}

impl TimestampBuilder {
    pub fn new(id: impl Into<TokenId>, timestamp_type: TimestampType) -> Self {
        Self {
            id: id.into(),
            timestamp_type,
            production_time: None,
            signing_certificate_id: None,
            signature: SignatureInfo::default(),
            message_imprint_intact: true,
            covered: Vec::new(),
        }
    }

    pub fn produced_at(mut self, at: DateTime<Utc>) -> Self {
        self.production_time = Some(at);
        self
    }

    pub fn signer(mut self, certificate_id: impl Into<TokenId>) -> Self {
        self.signing_certificate_id = Some(certificate_id.into());
        self
    }

    pub fn signature(mut self, signature: SignatureInfo) -> Self {
        self.signature = signature;
        self
    }

    pub fn message_imprint_intact(mut self, intact: bool) -> Self {
        self.message_imprint_intact = intact;
        self
    }

    pub fn covers(mut self, id: impl Into<TokenId>) -> Self {
        self.covered.push(id.into());
        self
    }

    pub fn build(self) -> Result<Timestamp> {
        let production_time = self
            .production_time
            .ok_or(VerdictError::MissingField("production_time".into()))?;

        Ok(Timestamp {
            id: self.id,
            timestamp_type: self.timestamp_type,
            production_time,
            signing_certificate_id: self.signing_certificate_id,
            signature: self.signature,
            message_imprint_intact: self.message_imprint_intact,
            covered: self.covered,
        })
    }
}

fn default_true() -> bool {
    true
}

/// The signature under validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: TokenId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_certificate_id: Option<TokenId>,

    #[serde(default = "default_true")]
    pub signing_certificate_digest_match: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_signing_time: Option<DateTime<Utc>>,

    pub signature: SignatureInfo,

    pub reference_data_found: bool,

    pub reference_data_intact: bool,
}

impl Signature {
    pub fn builder(id: impl Into<TokenId>) -> SignatureBuilder {
        SignatureBuilder::new(id)
    }
}

impl SignedToken for Signature {
    fn id(&self) -> &TokenId {
        &self.id
    }

    fn signing_certificate_id(&self) -> Option<&TokenId> {
        self.signing_certificate_id.as_ref()
    }

    fn signature(&self) -> &SignatureInfo {
        &self.signature
    }

    fn reference_data_found(&self) -> bool {
        self.reference_data_found
    }

    fn reference_data_intact(&self) -> bool {
        self.reference_data_intact
    }

    fn signing_certificate_digest_match(&self) -> bool {
        self.signing_certificate_digest_match
    }

    fn claimed_signing_time(&self) -> Option<DateTime<Utc>> {
        self.claimed_signing_time
    }
}

/// Builder for [`Signature`]
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    id: TokenId,
    signing_certificate_id: Option<TokenId>,
    signing_certificate_digest_match: bool,
    claimed_signing_time: Option<DateTime<Utc>>,
    signature: SignatureInfo,
    reference_data_found: bool,
    reference_data_intact: bool,
}

impl SignatureBuilder {
    pub fn new(id: impl Into<TokenId>) -> Self {
        Self {
            id: id.into(),
            signing_certificate_id: None,
            signing_certificate_digest_match: true,
            claimed_signing_time: None,
            signature: SignatureInfo::default(),
            reference_data_found: true,
            reference_data_intact: true,
        }
    }

    pub fn signer(mut self, certificate_id: impl Into<TokenId>) -> Self {
        self.signing_certificate_id = Some(certificate_id.into());
        self
    }

    pub fn signing_certificate_digest_match(mut self, matches: bool) -> Self {
        self.signing_certificate_digest_match = matches;
        self
    }

    pub fn claimed_signing_time(mut self, at: DateTime<Utc>) -> Self {
        self.claimed_signing_time = Some(at);
        self
    }

    pub fn signature(mut self, signature: SignatureInfo) -> Self {
        self.signature = signature;
        self
    }

    pub fn reference_data_found(mut self, found: bool) -> Self {
        self.reference_data_found = found;
        self
    }

    pub fn reference_data_intact(mut self, intact: bool) -> Self {
        self.reference_data_intact = intact;
        self
    }

    pub fn build(self) -> Result<Signature> {
        Ok(Signature {
            id: self.id,
            signing_certificate_id: self.signing_certificate_id,
            signing_certificate_digest_match: self.signing_certificate_digest_match,
            claimed_signing_time: self.claimed_signing_time,
            signature: self.signature,
            reference_data_found: self.reference_data_found,
            reference_data_intact: self.reference_data_intact,
        })
    }
}
