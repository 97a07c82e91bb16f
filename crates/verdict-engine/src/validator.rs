//! Document-level validation
//!
//! Timestamps are validated first, latest production time first, so that an
//! archive timestamp can give a proof of existence to the timestamps it
//! covers before those are validated. Only timestamps concluding `VALID`
//! contribute proofs. Signatures are then validated independently against
//! the resulting [`PoeSet`]; a failure inside one token is reported as
//! `INDETERMINATE / UNEXPECTED_ERROR` for that token only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use verdict_core::{
    Conclusion, Context, DiagnosticData, Timestamp, TokenId, ValidationPolicy, VerdictError,
    DEFAULT_MAX_CHAIN_DEPTH,
};

use crate::basic;
use crate::chain::{Block, BlockKind};
use crate::context::ProcessContext;
use crate::poe::PoeSet;

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Maximum number of certificates in a built chain
    pub max_chain_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

/// Verdict for one token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub token_id: TokenId,

    /// Final conclusion, same as `block.conclusion`
    pub conclusion: Conclusion,

    /// Basic validation report tree
    pub block: Block,
}

impl TokenReport {
    fn new(token_id: TokenId, block: Block) -> Self {
        Self {
            token_id,
            conclusion: block.conclusion.clone(),
            block,
        }
    }
}

/// Verdicts for every timestamp and signature of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub validation_time: DateTime<Utc>,

    pub policy: String,

    pub timestamps: Vec<TokenReport>,

    pub signatures: Vec<TokenReport>,
}

impl ValidationReport {
    pub fn signature(&self, id: &TokenId) -> Option<&TokenReport> {
        self.signatures.iter().find(|r| &r.token_id == id)
    }

    pub fn timestamp(&self, id: &TokenId) -> Option<&TokenReport> {
        self.timestamps.iter().find(|r| &r.token_id == id)
    }
}

/// Validates every token of one diagnostic snapshot
#[derive(Clone)]
pub struct DocumentValidator {
    diagnostic: Arc<DiagnosticData>,
    policy: Arc<dyn ValidationPolicy>,
    validation_time: DateTime<Utc>,
    config: ValidatorConfig,
}

impl DocumentValidator {
    pub fn new(
        diagnostic: Arc<DiagnosticData>,
        policy: Arc<dyn ValidationPolicy>,
        validation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            diagnostic,
            policy,
            validation_time,
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    pub fn diagnostic(&self) -> &DiagnosticData {
        &self.diagnostic
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    fn context<'a>(&'a self, poe: &'a PoeSet) -> ProcessContext<'a> {
        ProcessContext::new(&self.diagnostic, self.policy.as_ref(), poe, self.config.max_chain_depth)
    }

    fn validate_timestamp(&self, poe: &PoeSet, timestamp: &Timestamp) -> TokenReport {
        let ctx = self.context(poe);
        let block = basic::validate(&ctx, timestamp, Context::Timestamp, self.validation_time)
            .unwrap_or_else(|err| unexpected_error(&timestamp.id, err));
        TokenReport::new(timestamp.id.clone(), block)
    }

    /// Validate every timestamp and gather the proofs of existence they give
    pub fn extract_poe(&self) -> (PoeSet, Vec<TokenReport>) {
        let mut poe = PoeSet::new(&self.diagnostic, self.validation_time);

        let mut timestamps: Vec<&Timestamp> = self.diagnostic.timestamps().collect();
        timestamps.sort_by(|a, b| {
            b.production_time
                .cmp(&a.production_time)
                .then_with(|| b.timestamp_type.cmp(&a.timestamp_type))
        });

        let mut reports = Vec::with_capacity(timestamps.len());
        for timestamp in timestamps {
            if timestamp.production_time > self.validation_time {
                warn!(
                    timestamp = %timestamp.id,
                    production_time = %timestamp.production_time,
                    validation_time = %self.validation_time,
                    "Timestamp produced after the validation time"
                );
            }

            let report = self.validate_timestamp(&poe, timestamp);
            if report.conclusion.is_valid() {
                let added = poe.add_timestamp(timestamp);
                debug!(timestamp = %timestamp.id, added, "Timestamp gives proofs of existence");
            } else {
                debug!(
                    timestamp = %timestamp.id,
                    indication = %report.conclusion.indication,
                    sub_indication = ?report.conclusion.sub_indication,
                    "Timestamp not valid, no proof of existence"
                );
            }
            reports.push(report);
        }

        (poe, reports)
    }

    /// Validate one signature against an extracted POE set
    pub fn validate_signature(&self, poe: &PoeSet, id: &TokenId) -> TokenReport {
        let Some(signature) = self.diagnostic.signature(id) else {
            let err = VerdictError::UnknownToken {
                kind: "signature",
                id: id.to_string(),
            };
            return TokenReport::new(id.clone(), unexpected_error(id, err));
        };

        let ctx = self.context(poe);
        let block = basic::validate(&ctx, signature, Context::Signature, self.validation_time)
            .unwrap_or_else(|err| unexpected_error(id, err));

        info!(
            signature = %id,
            indication = %block.conclusion.indication,
            sub_indication = ?block.conclusion.sub_indication,
            "Signature validated"
        );
        TokenReport::new(id.clone(), block)
    }

    /// Validate the whole snapshot sequentially
    pub fn validate(&self) -> ValidationReport {
        info!(
            validation_time = %self.validation_time,
            policy = self.policy.name(),
            signatures = self.diagnostic.signatures().len(),
            "Starting validation"
        );

        let (poe, timestamps) = self.extract_poe();
        let signatures = self
            .diagnostic
            .signatures()
            .iter()
            .map(|signature| self.validate_signature(&poe, &signature.id))
            .collect();

        ValidationReport {
            validation_time: self.validation_time,
            policy: self.policy.name().to_string(),
            timestamps,
            signatures,
        }
    }
}

fn unexpected_error(id: &TokenId, err: VerdictError) -> Block {
    warn!(token = %id, error = %err, "Validation aborted with an unexpected error");
    Block::unexpected_error(BlockKind::Basic, id, err.to_string())
}
