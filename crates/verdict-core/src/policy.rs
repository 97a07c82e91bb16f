//! Validation policy
//!
//! The engine only sees the [`ValidationPolicy`] trait. [`EtsiPolicy`] is the
//! deserializable implementation shipped with the crate; it is immutable once
//! built and can be shared across threads.
//!
//! ## Lookups
//!
//! - **Constraint levels** keyed by context, optional sub-context and check key
//! - **Cryptographic constraints** per context, with optional algorithm expiry dates
//! - **Revocation freshness** (maximum accepted age) per context and sub-context
//! - **Accepted key usages** of signing certificates per context

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, VerdictError};
use crate::token::SignatureInfo;
use crate::types::{Context, DigestAlgorithm, EncryptionAlgorithm, KeyUsage, Level, SubContext};

/// Queryable validation policy
pub trait ValidationPolicy: Send + Sync {
    /// Policy name for reports and logs
    fn name(&self) -> &str;

    /// Level configured for a check, `None` when the policy is silent
    fn constraint_level(
        &self,
        context: Context,
        sub_context: Option<SubContext>,
        check: &str,
    ) -> Option<Level>;

    /// Cryptographic constraints applying to tokens of a context
    fn cryptographic_constraint(&self, context: Context) -> &CryptographicConstraint;

    /// Maximum accepted age of revocation data, overriding `nextUpdate - thisUpdate`
    fn revocation_freshness(&self, context: Context, sub_context: SubContext) -> Option<Duration>;

    /// Key usages of which a signing certificate must carry at least one
    fn accepted_key_usages(&self, context: Context) -> &[KeyUsage];
}

// =============================================================================
// Cryptographic constraints
// =============================================================================

/// An accepted algorithm, optionally reliable only until a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmRule<A> {
    pub algorithm: A,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl<A> AlgorithmRule<A> {
    pub fn new(algorithm: A) -> Self {
        Self {
            algorithm,
            expires_at: None,
        }
    }

    pub fn until(algorithm: A, expires_at: DateTime<Utc>) -> Self {
        Self {
            algorithm,
            expires_at: Some(expires_at),
        }
    }
}

/// Keys of at least `min_size` bits are acceptable, optionally only until a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySizeRule {
    pub algorithm: EncryptionAlgorithm,

    pub min_size: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// How long a combination of algorithms stays reliable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    /// Not accepted at any time
    Never,
    /// Accepted up to and including the date
    Until(DateTime<Utc>),
    /// No expiry
    Always,
}

impl Reliability {
    /// Whether the algorithms are reliable at `at`
    pub fn covers(self, at: DateTime<Utc>) -> bool {
        match self {
            Reliability::Never => false,
            Reliability::Until(expires_at) => at <= expires_at,
            Reliability::Always => true,
        }
    }

    /// The weaker of two reliabilities
    pub fn min(self, other: Reliability) -> Reliability {
        match (self, other) {
            (Reliability::Never, _) | (_, Reliability::Never) => Reliability::Never,
            (Reliability::Always, r) | (r, Reliability::Always) => r,
            (Reliability::Until(a), Reliability::Until(b)) => Reliability::Until(a.min(b)),
        }
    }

    fn from_expiry(expires_at: Option<DateTime<Utc>>) -> Self {
        expires_at.map_or(Reliability::Always, Reliability::Until)
    }
}

/// Why a signature's algorithms were rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoFailure {
    #[error("digest algorithm {0:?} is not accepted")]
    DigestNotAccepted(DigestAlgorithm),

    #[error("digest algorithm {algorithm:?} expired at {expired_at}")]
    DigestExpired {
        algorithm: DigestAlgorithm,
        expired_at: DateTime<Utc>,
    },

    #[error("encryption algorithm {0:?} is not accepted")]
    EncryptionNotAccepted(EncryptionAlgorithm),

    #[error("encryption algorithm {algorithm:?} expired at {expired_at}")]
    EncryptionExpired {
        algorithm: EncryptionAlgorithm,
        expired_at: DateTime<Utc>,
    },

    #[error("{algorithm:?} key of {key_size} bits is below every accepted minimum")]
    KeySizeTooSmall {
        algorithm: EncryptionAlgorithm,
        key_size: u32,
    },

    #[error("{algorithm:?} key of {key_size} bits expired at {expired_at}")]
    KeySizeExpired {
        algorithm: EncryptionAlgorithm,
        key_size: u32,
        expired_at: DateTime<Utc>,
    },
}

/// Accepted algorithms and key sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptographicConstraint {
    pub digest_algorithms: Vec<AlgorithmRule<DigestAlgorithm>>,

    pub encryption_algorithms: Vec<AlgorithmRule<EncryptionAlgorithm>>,

    /// Algorithms without any rule have no key size constraint
    #[serde(default)]
    pub key_sizes: Vec<KeySizeRule>,
}

fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl Default for CryptographicConstraint {
    /// Algorithm catalogue along the lines of ETSI TS 119 312
    fn default() -> Self {
        use DigestAlgorithm::*;
        use EncryptionAlgorithm::*;

        Self {
            digest_algorithms: vec![
                AlgorithmRule::until(Md5, utc(2004, 8, 1)),
                AlgorithmRule::until(Sha1, utc(2009, 8, 1)),
                AlgorithmRule::new(Sha224),
                AlgorithmRule::new(Sha256),
                AlgorithmRule::new(Sha384),
                AlgorithmRule::new(Sha512),
                AlgorithmRule::new(Sha3_256),
                AlgorithmRule::new(Sha3_384),
                AlgorithmRule::new(Sha3_512),
            ],
            encryption_algorithms: vec![
                AlgorithmRule::new(Rsa),
                AlgorithmRule::new(RsaPss),
                AlgorithmRule::new(Dsa),
                AlgorithmRule::new(Ecdsa),
                AlgorithmRule::new(Ed25519),
                AlgorithmRule::new(Ed448),
            ],
            key_sizes: vec![
                KeySizeRule { algorithm: Rsa, min_size: 1024, expires_at: Some(utc(2013, 1, 1)) },
                KeySizeRule { algorithm: Rsa, min_size: 1900, expires_at: None },
                KeySizeRule { algorithm: RsaPss, min_size: 1024, expires_at: Some(utc(2013, 1, 1)) },
                KeySizeRule { algorithm: RsaPss, min_size: 1900, expires_at: None },
                KeySizeRule { algorithm: Dsa, min_size: 1024, expires_at: Some(utc(2013, 1, 1)) },
                KeySizeRule { algorithm: Dsa, min_size: 2048, expires_at: None },
                KeySizeRule { algorithm: Ecdsa, min_size: 160, expires_at: Some(utc(2013, 1, 1)) },
                KeySizeRule { algorithm: Ecdsa, min_size: 256, expires_at: None },
            ],
        }
    }
}

impl CryptographicConstraint {
    /// Replace (or add) the rule for a digest algorithm
    pub fn with_digest(mut self, rule: AlgorithmRule<DigestAlgorithm>) -> Self {
        self.digest_algorithms.retain(|r| r.algorithm != rule.algorithm);
        self.digest_algorithms.push(rule);
        self
    }

    /// Replace (or add) the rule for an encryption algorithm
    pub fn with_encryption(mut self, rule: AlgorithmRule<EncryptionAlgorithm>) -> Self {
        self.encryption_algorithms.retain(|r| r.algorithm != rule.algorithm);
        self.encryption_algorithms.push(rule);
        self
    }

    pub fn with_key_size(mut self, rule: KeySizeRule) -> Self {
        self.key_sizes.push(rule);
        self
    }

    /// Check the algorithms of a signature at a given time
    pub fn evaluate(&self, signature: &SignatureInfo, at: DateTime<Utc>) -> std::result::Result<(), CryptoFailure> {
        let digest = signature.digest_algorithm;
        match self.digest_algorithms.iter().find(|r| r.algorithm == digest) {
            None => return Err(CryptoFailure::DigestNotAccepted(digest)),
            Some(AlgorithmRule { expires_at: Some(expired_at), .. }) if at > *expired_at => {
                return Err(CryptoFailure::DigestExpired {
                    algorithm: digest,
                    expired_at: *expired_at,
                })
            }
            Some(_) => {}
        }

        let encryption = signature.encryption_algorithm;
        match self.encryption_algorithms.iter().find(|r| r.algorithm == encryption) {
            None => return Err(CryptoFailure::EncryptionNotAccepted(encryption)),
            Some(AlgorithmRule { expires_at: Some(expired_at), .. }) if at > *expired_at => {
                return Err(CryptoFailure::EncryptionExpired {
                    algorithm: encryption,
                    expired_at: *expired_at,
                })
            }
            Some(_) => {}
        }

        match self.key_size_reliability(signature) {
            Reliability::Never => Err(CryptoFailure::KeySizeTooSmall {
                algorithm: encryption,
                key_size: signature.key_size,
            }),
            Reliability::Until(expired_at) if at > expired_at => Err(CryptoFailure::KeySizeExpired {
                algorithm: encryption,
                key_size: signature.key_size,
                expired_at,
            }),
            _ => Ok(()),
        }
    }

    pub fn is_acceptable(&self, signature: &SignatureInfo, at: DateTime<Utc>) -> bool {
        self.evaluate(signature, at).is_ok()
    }

    /// Latest time up to which every algorithm of the signature was reliable
    pub fn reliability(&self, signature: &SignatureInfo) -> Reliability {
        let digest = self
            .digest_algorithms
            .iter()
            .find(|r| r.algorithm == signature.digest_algorithm)
            .map_or(Reliability::Never, |r| Reliability::from_expiry(r.expires_at));

        let encryption = self
            .encryption_algorithms
            .iter()
            .find(|r| r.algorithm == signature.encryption_algorithm)
            .map_or(Reliability::Never, |r| Reliability::from_expiry(r.expires_at));

        digest.min(encryption).min(self.key_size_reliability(signature))
    }

    fn key_size_reliability(&self, signature: &SignatureInfo) -> Reliability {
        let rules: Vec<&KeySizeRule> = self
            .key_sizes
            .iter()
            .filter(|r| r.algorithm == signature.encryption_algorithm)
            .collect();
        if rules.is_empty() {
            return Reliability::Always;
        }

        let satisfied = rules.iter().filter(|r| signature.key_size >= r.min_size);
        let mut best = Reliability::Never;
        for rule in satisfied {
            match rule.expires_at {
                None => return Reliability::Always,
                Some(at) => {
                    best = match best {
                        Reliability::Until(current) if current >= at => best,
                        _ => Reliability::Until(at),
                    }
                }
            }
        }
        best
    }
}

// =============================================================================
// EtsiPolicy
// =============================================================================

/// Level override for one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRule {
    pub context: Context,

    /// `None` applies to every sub-context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_context: Option<SubContext>,

    /// Check key, e.g. `xcv.revocation_data_available`
    pub check: String,

    pub level: Level,
}

/// Maximum accepted age of revocation data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessRule {
    pub context: Context,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_context: Option<SubContext>,

    pub max_age_seconds: i64,
}

/// Cryptographic constraint overriding the default for one context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCryptographicConstraint {
    pub context: Context,

    pub constraint: CryptographicConstraint,
}

/// Accepted signing-certificate key usages for one context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUsageRule {
    pub context: Context,

    pub accepted: Vec<KeyUsage>,
}

const DEFAULT_KEY_USAGES: &[KeyUsage] = &[KeyUsage::NonRepudiation, KeyUsage::DigitalSignature];

fn default_policy_name() -> String {
    "etsi-en-319102-1".to_string()
}

fn default_key_usage_rules() -> Vec<KeyUsageRule> {
    vec![
        KeyUsageRule {
            context: Context::Signature,
            accepted: vec![KeyUsage::NonRepudiation, KeyUsage::DigitalSignature],
        },
        KeyUsageRule {
            context: Context::Timestamp,
            accepted: vec![KeyUsage::DigitalSignature, KeyUsage::NonRepudiation],
        },
        KeyUsageRule {
            context: Context::Revocation,
            accepted: vec![KeyUsage::DigitalSignature, KeyUsage::CrlSign],
        },
    ]
}

/// Deserializable, immutable validation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtsiPolicy {
    #[serde(default = "default_policy_name")]
    pub name: String,

    #[serde(default)]
    pub constraints: Vec<ConstraintRule>,

    #[serde(default)]
    pub cryptographic: CryptographicConstraint,

    #[serde(default)]
    pub cryptographic_overrides: Vec<ContextCryptographicConstraint>,

    #[serde(default)]
    pub revocation_freshness: Vec<FreshnessRule>,

    #[serde(default = "default_key_usage_rules")]
    pub key_usages: Vec<KeyUsageRule>,
}

impl Default for EtsiPolicy {
    fn default() -> Self {
        Self {
            name: default_policy_name(),
            constraints: Vec::new(),
            cryptographic: CryptographicConstraint::default(),
            cryptographic_overrides: Vec::new(),
            revocation_freshness: Vec::new(),
            key_usages: default_key_usage_rules(),
        }
    }
}

impl EtsiPolicy {
    /// Parse a JSON policy and check it for consistency
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: EtsiPolicy = serde_json::from_str(json)?;
        policy.check()?;
        Ok(policy)
    }

    /// Reject negative freshness and duplicated rules
    pub fn check(&self) -> Result<()> {
        if let Some(rule) = self.revocation_freshness.iter().find(|r| r.max_age_seconds < 0) {
            return Err(VerdictError::InvalidPolicy(format!(
                "negative revocation freshness for {:?}",
                rule.context
            )));
        }

        for (i, rule) in self.constraints.iter().enumerate() {
            let duplicate = self.constraints[i + 1..].iter().any(|other| {
                other.context == rule.context
                    && other.sub_context == rule.sub_context
                    && other.check == rule.check
            });
            if duplicate {
                return Err(VerdictError::InvalidPolicy(format!(
                    "duplicate constraint '{}' for {:?}",
                    rule.check, rule.context
                )));
            }
        }

        Ok(())
    }

    /// Set the level of a check
    pub fn with_level(
        mut self,
        context: Context,
        sub_context: Option<SubContext>,
        check: impl Into<String>,
        level: Level,
    ) -> Self {
        let check = check.into();
        self.constraints.retain(|r| {
            !(r.context == context && r.sub_context == sub_context && r.check == check)
        });
        self.constraints.push(ConstraintRule {
            context,
            sub_context,
            check,
            level,
        });
        self
    }

    /// Set the maximum accepted age of revocation data
    pub fn with_revocation_freshness(
        mut self,
        context: Context,
        sub_context: Option<SubContext>,
        max_age: Duration,
    ) -> Self {
        self.revocation_freshness
            .retain(|r| !(r.context == context && r.sub_context == sub_context));
        self.revocation_freshness.push(FreshnessRule {
            context,
            sub_context,
            max_age_seconds: max_age.num_seconds(),
        });
        self
    }

    /// Replace the default cryptographic constraint
    pub fn with_cryptographic(mut self, constraint: CryptographicConstraint) -> Self {
        self.cryptographic = constraint;
        self
    }

    /// Override the cryptographic constraint for one context
    pub fn with_context_cryptographic(mut self, context: Context, constraint: CryptographicConstraint) -> Self {
        self.cryptographic_overrides.retain(|c| c.context != context);
        self.cryptographic_overrides
            .push(ContextCryptographicConstraint { context, constraint });
        self
    }
}

impl ValidationPolicy for EtsiPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn constraint_level(
        &self,
        context: Context,
        sub_context: Option<SubContext>,
        check: &str,
    ) -> Option<Level> {
        let matching = |r: &&ConstraintRule| r.context == context && r.check == check;

        // A rule naming the sub-context wins over a context-wide rule
        self.constraints
            .iter()
            .filter(matching)
            .find(|r| sub_context.is_some() && r.sub_context == sub_context)
            .or_else(|| {
                self.constraints
                    .iter()
                    .filter(matching)
                    .find(|r| r.sub_context.is_none())
            })
            .map(|r| r.level)
    }

    fn cryptographic_constraint(&self, context: Context) -> &CryptographicConstraint {
        self.cryptographic_overrides
            .iter()
            .find(|c| c.context == context)
            .map_or(&self.cryptographic, |c| &c.constraint)
    }

    fn revocation_freshness(&self, context: Context, sub_context: SubContext) -> Option<Duration> {
        let matching = |r: &&FreshnessRule| r.context == context;

        self.revocation_freshness
            .iter()
            .filter(matching)
            .find(|r| r.sub_context == Some(sub_context))
            .or_else(|| {
                self.revocation_freshness
                    .iter()
                    .filter(matching)
                    .find(|r| r.sub_context.is_none())
            })
            .map(|r| Duration::seconds(r.max_age_seconds))
    }

    fn accepted_key_usages(&self, context: Context) -> &[KeyUsage] {
        self.key_usages
            .iter()
            .find(|r| r.context == context)
            .map_or(DEFAULT_KEY_USAGES, |r| r.accepted.as_slice())
    }
}
