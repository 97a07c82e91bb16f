//! Shared fixtures for the engine integration tests
//!
//! A small PKI: a trusted `root`, a signer certificate `leaf` and a TSA
//! certificate `tsa`, both issued by `root`, each with its own OCSP response.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use verdict_core::{
    Certificate, Context, DiagnosticDataBuilder, EtsiPolicy, ExtendedKeyUsage, KeyUsage,
    RevocationData, RevocationReason, Signature, SignatureBuilder, Timestamp, TimestampType,
    ValidationPolicy,
};
use verdict_engine::{DocumentValidator, ValidationReport};

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Validation time used by most scenarios
pub fn now() -> DateTime<Utc> {
    date(2021, 6, 1)
}

pub fn root() -> Certificate {
    Certificate::builder("root")
        .validity(date(2010, 1, 1), date(2040, 1, 1))
        .self_signed()
        .trusted()
        .ca()
        .build()
        .expect("root certificate")
}

/// Signer certificate valid 2020-01-01..2023-01-01, status in `ocsp-leaf`
pub fn leaf() -> Certificate {
    Certificate::builder("leaf")
        .issuer("root")
        .validity(date(2020, 1, 1), date(2023, 1, 1))
        .key_usage(KeyUsage::NonRepudiation)
        .revocation("ocsp-leaf")
        .build()
        .expect("leaf certificate")
}

/// Signer certificate without any revocation data
pub fn leaf_without_revocation() -> Certificate {
    Certificate::builder("leaf")
        .issuer("root")
        .validity(date(2020, 1, 1), date(2023, 1, 1))
        .key_usage(KeyUsage::NonRepudiation)
        .build()
        .expect("leaf certificate")
}

pub fn tsa() -> Certificate {
    Certificate::builder("tsa")
        .issuer("root")
        .validity(date(2015, 1, 1), date(2030, 1, 1))
        .key_usage(KeyUsage::DigitalSignature)
        .extended_key_usage(ExtendedKeyUsage::TimeStamping)
        .revocation("ocsp-tsa")
        .build()
        .expect("tsa certificate")
}

pub fn leaf_good() -> RevocationData {
    RevocationData::ocsp("ocsp-leaf")
        .signer("root")
        .produced_at(now())
        .good("leaf")
        .build()
        .expect("leaf OCSP response")
}

pub fn leaf_revoked(at: DateTime<Utc>) -> RevocationData {
    RevocationData::ocsp("ocsp-leaf")
        .signer("root")
        .produced_at(now())
        .revoked("leaf", at, Some(RevocationReason::KeyCompromise))
        .build()
        .expect("leaf OCSP response")
}

pub fn tsa_good() -> RevocationData {
    RevocationData::ocsp("ocsp-tsa")
        .signer("root")
        .produced_at(now())
        .good("tsa")
        .build()
        .expect("tsa OCSP response")
}

pub fn signature() -> SignatureBuilder {
    Signature::builder("sig")
        .signer("leaf")
        .claimed_signing_time(date(2020, 6, 1))
}

/// Signature timestamp by `tsa` over `sig`
pub fn signature_timestamp(id: &str, at: DateTime<Utc>) -> Timestamp {
    Timestamp::builder(id, TimestampType::SignatureTimestamp)
        .produced_at(at)
        .signer("tsa")
        .covers("sig")
        .build()
        .expect("signature timestamp")
}

/// PKI with a TSA and the given leaf status
pub fn pki(leaf_status: RevocationData) -> DiagnosticDataBuilder {
    verdict_core::DiagnosticData::builder()
        .certificate(root())
        .certificate(leaf())
        .certificate(tsa())
        .revocation(leaf_status)
        .revocation(tsa_good())
}

/// Default policy with a one-day revocation TTL for signatures and timestamps
pub fn policy() -> EtsiPolicy {
    EtsiPolicy::default()
        .with_revocation_freshness(Context::Signature, None, Duration::days(1))
        .with_revocation_freshness(Context::Timestamp, None, Duration::days(1))
}

pub fn validate(data: DiagnosticDataBuilder, policy: EtsiPolicy, at: DateTime<Utc>) -> ValidationReport {
    let data = data.build().expect("diagnostic data");
    let policy: Arc<dyn ValidationPolicy> = Arc::new(policy);
    DocumentValidator::new(Arc::new(data), policy, at).validate()
}
