//! # Verdict Core
//!
//! Data model for signature validation following ETSI EN 319102-1. The
//! validation processes themselves live in `verdict-engine`; this crate holds
//! the immutable inputs they consume and the conclusions they produce.
//!
//! ## Key Concepts
//!
//! - **Diagnostic data**: snapshot of certificates, revocation data, timestamps and signatures
//! - **Indication / SubIndication**: the verdict, `VALID`, `INVALID` or `INDETERMINATE`
//! - **Conclusion**: a verdict plus the ordered message keys that led to it
//! - **Policy**: constraint levels, cryptographic constraints and freshness rules
//! - **POE**: proof that a token existed at a given time

pub mod conclusion;
pub mod diagnostic;
pub mod error;
pub mod poe;
pub mod policy;
pub mod token;
pub mod types;

pub use conclusion::{Conclusion, Message, Severity};
pub use diagnostic::{
    CertificateChain, ChainTermination, DiagnosticData, DiagnosticDataBuilder, DEFAULT_MAX_CHAIN_DEPTH,
};
pub use error::{Result, VerdictError};
pub use poe::{Poe, PoeTimestamp};
pub use policy::{
    AlgorithmRule, CryptoFailure, CryptographicConstraint, EtsiPolicy, KeySizeRule, Reliability,
    ValidationPolicy,
};
pub use token::{
    Certificate, CertificateBuilder, CertificateStatus, RevocationBuilder, RevocationData,
    RevocationEntry, Signature, SignatureBuilder, SignatureInfo, SignedToken, Timestamp,
    TimestampBuilder, TokenId,
};
pub use types::{
    Context, DigestAlgorithm, EncryptionAlgorithm, ExtendedKeyUsage, Indication, KeyUsage, Level,
    RevocationKind, RevocationReason, SubContext, SubIndication, TimestampType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
