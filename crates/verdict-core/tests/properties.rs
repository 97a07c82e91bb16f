//! Property-Based Tests for the Data Model
//!
//! These tests verify model-level guarantees for arbitrary inputs:
//! 1. RELIABILITY: an algorithm acceptable at some time was acceptable before
//! 2. CHAIN BOUND: chain building always terminates within the depth bound

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use verdict_core::{
    AlgorithmRule, Certificate, ChainTermination, CryptographicConstraint, DiagnosticData,
    DigestAlgorithm, EncryptionAlgorithm, KeySizeRule, SignatureInfo,
};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}

fn day(n: i64) -> DateTime<Utc> {
    base() + Duration::days(n)
}

// =============================================================================
// PROPERTY 1: RELIABILITY MONOTONICITY
// =============================================================================

fn digest() -> impl Strategy<Value = DigestAlgorithm> {
    prop_oneof![
        Just(DigestAlgorithm::Md5),
        Just(DigestAlgorithm::Sha1),
        Just(DigestAlgorithm::Sha256),
        Just(DigestAlgorithm::Sha512),
    ]
}

fn encryption() -> impl Strategy<Value = EncryptionAlgorithm> {
    prop_oneof![
        Just(EncryptionAlgorithm::Rsa),
        Just(EncryptionAlgorithm::Dsa),
        Just(EncryptionAlgorithm::Ecdsa),
    ]
}

fn constraint() -> impl Strategy<Value = CryptographicConstraint> {
    (0..10_000i64, 0..10_000i64, 512..4096u32, prop::option::of(0..10_000i64)).prop_map(
        |(sha1_until, rsa_until, min_size, size_until)| {
            CryptographicConstraint::default()
                .with_digest(AlgorithmRule::until(DigestAlgorithm::Sha1, day(sha1_until)))
                .with_encryption(AlgorithmRule::until(EncryptionAlgorithm::Rsa, day(rsa_until)))
                .with_key_size(KeySizeRule {
                    algorithm: EncryptionAlgorithm::Rsa,
                    min_size,
                    expires_at: size_until.map(day),
                })
        },
    )
}

proptest! {
    /// Acceptable at `later` implies acceptable at every earlier time
    #[test]
    fn prop_acceptance_is_monotonic(
        constraint in constraint(),
        digest in digest(),
        encryption in encryption(),
        key_size in 256..8192u32,
        earlier in 0..10_000i64,
        gap in 0..5_000i64,
    ) {
        let signature = SignatureInfo::new(digest, encryption, key_size);
        if constraint.is_acceptable(&signature, day(earlier + gap)) {
            prop_assert!(constraint.is_acceptable(&signature, day(earlier)));
        }
    }

    /// `reliability` agrees with `is_acceptable` at every instant
    #[test]
    fn prop_reliability_matches_acceptance(
        constraint in constraint(),
        digest in digest(),
        encryption in encryption(),
        key_size in 256..8192u32,
        at in 0..15_000i64,
    ) {
        let signature = SignatureInfo::new(digest, encryption, key_size);
        prop_assert_eq!(
            constraint.reliability(&signature).covers(day(at)),
            constraint.is_acceptable(&signature, day(at))
        );
    }
}

// =============================================================================
// PROPERTY 2: CHAIN BOUND
// =============================================================================

/// `length` certificates, each issued by the next; the last one either
/// trusted or pointing back at the first
fn linear_chain(length: usize, cyclic: bool) -> DiagnosticData {
    let mut builder = DiagnosticData::builder();
    for i in 0..length {
        let issuer = if i + 1 < length {
            format!("c{}", i + 1)
        } else if cyclic {
            "c0".to_string()
        } else {
            format!("c{i}")
        };
        let mut certificate = Certificate::builder(format!("c{i}"))
            .issuer(issuer)
            .validity(day(0), day(1000));
        if i + 1 == length && !cyclic {
            certificate = certificate.self_signed().trusted();
        }
        builder = builder.certificate(certificate.build().unwrap());
    }
    builder.build().unwrap()
}

proptest! {
    #[test]
    fn prop_chain_never_exceeds_depth(
        length in 1..40usize,
        max_depth in 1..40usize,
        cyclic in any::<bool>(),
    ) {
        let data = linear_chain(length, cyclic);
        let chain = data.certificate_chain(&"c0".into(), max_depth).unwrap();

        prop_assert!(chain.len() <= max_depth);
        prop_assert!(chain.len() <= length);

        match chain.termination() {
            ChainTermination::TrustAnchor => {
                prop_assert!(!cyclic);
                prop_assert_eq!(chain.len(), length);
            }
            ChainTermination::DepthExceeded => prop_assert_eq!(chain.len(), max_depth),
            ChainTermination::Cycle => {
                prop_assert!(cyclic);
                prop_assert_eq!(chain.len(), length);
            }
            other => prop_assert!(false, "unexpected termination {:?}", other),
        }
    }
}
