//! Check table
//!
//! Every predicate evaluated by a validation process is described by one
//! static [`Check`]: its policy key, success and failure message keys, the
//! outcome written when it fails at `FAIL` level, its default level and
//! whether the policy may change that level.

use verdict_core::{Indication, Level, SubIndication};

use crate::chain::Check;

macro_rules! check {
    ($(#[$meta:meta])* $name:ident, $key:literal, $indication:ident, $sub:ident, $level:ident, $configurable:expr) => {
        $(#[$meta])*
        pub static $name: Check = Check {
            key: $key,
            success: concat!($key, ".passed"),
            failure: concat!($key, ".failed"),
            indication: Indication::$indication,
            sub_indication: Some(SubIndication::$sub),
            default_level: Level::$level,
            configurable: $configurable,
        };
    };
    ($(#[$meta:meta])* $name:ident, $key:literal, $indication:ident, $level:ident, $configurable:expr) => {
        $(#[$meta])*
        pub static $name: Check = Check {
            key: $key,
            success: concat!($key, ".passed"),
            failure: concat!($key, ".failed"),
            indication: Indication::$indication,
            sub_indication: None,
            default_level: Level::$level,
            configurable: $configurable,
        };
    };
}

// =============================================================================
// Identification of the signing certificate
// =============================================================================

check!(ISC_SIGNING_CERTIFICATE_IDENTIFIED, "isc.signing_certificate_identified", Indeterminate, NoSigningCertificateFound, Fail, false);
check!(
    /// The signing-certificate reference digest matches the identified certificate
    ISC_SIGNING_CERTIFICATE_DIGEST_MATCH, "isc.signing_certificate_digest_match", Indeterminate, NoSigningCertificateFound, Fail, true
);

// =============================================================================
// Cryptographic verification
// =============================================================================

check!(CV_REFERENCE_DATA_FOUND, "cv.reference_data_found", Indeterminate, SignedDataNotFound, Fail, false);
check!(CV_REFERENCE_DATA_INTACT, "cv.reference_data_intact", Invalid, HashFailure, Fail, false);
check!(CV_SIGNATURE_INTACT, "cv.signature_intact", Invalid, SigCryptoFailure, Fail, false);

// =============================================================================
// Signature acceptance validation
// =============================================================================

check!(SAV_SIGNING_TIME_PRESENT, "sav.signing_time_present", Indeterminate, SigConstraintsFailure, Warn, true);
check!(SAV_ALGORITHMS_ACCEPTABLE, "sav.algorithms_acceptable", Indeterminate, CryptoConstraintsFailureNoPoe, Fail, true);

// =============================================================================
// X.509 certificate validation
// =============================================================================

check!(XCV_PROSPECTIVE_CHAIN_FOUND, "xcv.prospective_chain_found", Indeterminate, NoCertificateChainFound, Fail, false);
check!(
    /// Trust anchor still trusted at the validation time
    XCV_TRUST_ANCHOR_NOT_SUNSET, "xcv.trust_anchor_not_sunset", Indeterminate, NoCertificateChainFound, Fail, true
);
check!(XCV_CERTIFICATE_VALID, "xcv.certificate_valid", Indeterminate, CertificateChainGeneralFailure, Fail, false);

check!(XCV_CERTIFICATE_SIGNATURE_INTACT, "xcv.certificate_signature_intact", Indeterminate, CertificateChainGeneralFailure, Fail, false);
check!(XCV_SIGNING_CERTIFICATE_KEY_USAGE, "xcv.signing_certificate_key_usage", Indeterminate, SigConstraintsFailure, Fail, true);
check!(XCV_CA_KEY_CERT_SIGN, "xcv.ca_key_cert_sign", Indeterminate, ChainConstraintsFailure, Fail, true);
check!(XCV_CA_BASIC_CONSTRAINTS, "xcv.ca_basic_constraints", Indeterminate, ChainConstraintsFailure, Fail, true);
check!(XCV_IN_VALIDITY_RANGE, "xcv.in_validity_range", Indeterminate, OutOfBoundsNoPoe, Fail, false);
check!(XCV_CRYPTO_ACCEPTABLE, "xcv.crypto_acceptable", Indeterminate, CryptoConstraintsFailureNoPoe, Fail, true);
check!(XCV_REVOCATION_DATA_AVAILABLE, "xcv.revocation_data_available", Indeterminate, TryLater, Fail, true);
check!(XCV_ACCEPTABLE_REVOCATION_FOUND, "xcv.acceptable_revocation_found", Indeterminate, CertificateChainGeneralFailure, Fail, false);
check!(XCV_REVOCATION_FRESH, "xcv.revocation_fresh", Indeterminate, TryLater, Fail, false);
check!(
    /// Outcome is REVOKED_CA_NO_POE for CA certificates
    XCV_NOT_REVOKED, "xcv.not_revoked", Indeterminate, RevokedNoPoe, Fail, false
);
check!(XCV_NOT_ON_HOLD, "xcv.not_on_hold", Indeterminate, TryLater, Fail, true);

// =============================================================================
// Revocation acceptance, freshness and selection
// =============================================================================

check!(RAC_CERTIFICATE_STATUS_KNOWN, "rac.certificate_status_known", Indeterminate, Fail, false);
check!(RAC_ISSUER_MATCHES, "rac.issuer_matches", Indeterminate, Fail, false);
check!(RAC_SIGNATURE_INTACT, "rac.signature_intact", Indeterminate, Fail, false);
check!(RAC_PRODUCED_AFTER_ISSUANCE, "rac.produced_after_issuance", Indeterminate, Fail, false);
check!(
    /// The issuer still kept records of the certificate when it produced the object
    RAC_ISSUER_KNOWS_CERTIFICATE, "rac.issuer_knows_certificate", Indeterminate, Fail, false
);
check!(
    /// OCSP responder certificate valid at `producedAt`
    RAC_SIGNER_VALID_AT_PRODUCTION, "rac.signer_valid_at_production", Indeterminate, Fail, false
);
check!(
    /// Forward-only: carries the conclusion of the delegated responder's XCV
    RAC_RESPONDER_CHAIN_VALID, "rac.responder_chain_valid", Indeterminate, CertificateChainGeneralFailure, Fail, false
);
check!(RAC_CRYPTO_ACCEPTABLE, "rac.crypto_acceptable", Indeterminate, CryptoConstraintsFailure, Fail, true);

check!(
    /// Without a policy TTL, freshness needs nextUpdate
    RFC_NEXT_UPDATE_PRESENT, "rfc.next_update_present", Indeterminate, TryLater, Fail, false
);
check!(RFC_FRESH, "rfc.fresh", Indeterminate, TryLater, Fail, true);

check!(CRS_CANDIDATES_PRESENT, "crs.candidates_present", Indeterminate, TryLater, Fail, false);
check!(CRS_ACCEPTABLE_FOUND, "crs.acceptable_found", Indeterminate, CertificateChainGeneralFailure, Fail, false);

// =============================================================================
// Validation time sliding and past certificate validation
// =============================================================================

check!(VTS_CHAIN_ANCHORED, "vts.chain_anchored", Indeterminate, NoCertificateChainFound, Fail, false);
check!(VTS_WINDOW_INTERSECTS, "vts.window_intersects", Indeterminate, NoPoe, Fail, false);

check!(
    /// Forward-only: carries the conclusion of XCV at the control time
    PCV_CHAIN_VALID_AT_CONTROL_TIME, "pcv.chain_valid_at_control_time", Indeterminate, CertificateChainGeneralFailure, Fail, false
);

// =============================================================================
// Past signature validation
// =============================================================================

check!(PSV_CONTROL_TIME_FOUND, "psv.control_time_found", Indeterminate, NoPoe, Fail, false);
check!(
    /// Failure outcome is the current-time conclusion
    PSV_POE_BEFORE_CONTROL_TIME, "psv.poe_before_control_time", Indeterminate, NoPoe, Fail, false
);
check!(
    /// Forward-only: carries the conclusion of PCV
    PSV_PAST_CERTIFICATE_VALID, "psv.past_certificate_valid", Indeterminate, CertificateChainGeneralFailure, Fail, false
);
check!(PSV_BEST_TIME_AFTER_ISSUANCE, "psv.best_time_after_issuance", Invalid, NotYetValid, Fail, false);
check!(PSV_BEST_TIME_BEFORE_EXPIRATION, "psv.best_time_before_expiration", Indeterminate, OutOfBoundsNoPoe, Fail, false);
check!(PSV_ALGORITHMS_RELIABLE_AT_POE, "psv.algorithms_reliable_at_poe", Indeterminate, CryptoConstraintsFailureNoPoe, Fail, false);

// =============================================================================
// Basic validation orchestration
// =============================================================================

check!(BASIC_SIGNING_CERTIFICATE_IDENTIFIED, "basic.signing_certificate_identified", Indeterminate, NoSigningCertificateFound, Fail, false);
check!(
    /// Chain validation did not fail for a reason a POE cannot resolve
    BASIC_CHAIN_NOT_REJECTED, "basic.chain_not_rejected", Indeterminate, CertificateChainGeneralFailure, Fail, false
);
check!(BASIC_CRYPTOGRAPHIC_VERIFICATION, "basic.cryptographic_verification", Invalid, SigCryptoFailure, Fail, false);
check!(BASIC_SIGNATURE_NOT_REJECTED, "basic.signature_not_rejected", Indeterminate, SigConstraintsFailure, Fail, false);
check!(BASIC_CHAIN_CONCLUSIVE, "basic.chain_conclusive", Indeterminate, CertificateChainGeneralFailure, Fail, false);
check!(BASIC_SIGNATURE_ACCEPTED, "basic.signature_accepted", Indeterminate, SigConstraintsFailure, Fail, false);
