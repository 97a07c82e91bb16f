//! Proof of existence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::{Timestamp, TokenId};
use crate::types::TimestampType;

/// The timestamp backing a proof of existence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoeTimestamp {
    pub id: TokenId,

    #[serde(rename = "type")]
    pub timestamp_type: TimestampType,

    /// Objects covered by the timestamp, sorted
    pub covered: Vec<TokenId>,
}

impl PoeTimestamp {
    pub fn from_timestamp(timestamp: &Timestamp) -> Self {
        let mut covered = timestamp.covered.clone();
        covered.sort();
        covered.dedup();
        Self {
            id: timestamp.id.clone(),
            timestamp_type: timestamp.timestamp_type,
            covered,
        }
    }

    /// Every object covered by `self` is covered by `other`, and `other` covers more
    pub fn covers_strict_subset_of(&self, other: &PoeTimestamp) -> bool {
        self.covered.len() < other.covered.len()
            && self.covered.iter().all(|id| other.covered.binary_search(id).is_ok())
    }
}

/// Evidence that a token existed at `control_time`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poe {
    pub token_id: TokenId,

    pub control_time: DateTime<Utc>,

    /// `None` for the implicit proof at validation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<PoeTimestamp>,
}

impl Poe {
    /// Implicit proof that every token exists at the validation time
    pub fn at_validation_time(token_id: TokenId, validation_time: DateTime<Utc>) -> Self {
        Self {
            token_id,
            control_time: validation_time,
            timestamp: None,
        }
    }

    /// Proof for a covered object, backed by a timestamp
    pub fn from_timestamp(token_id: TokenId, timestamp: &Timestamp) -> Self {
        Self {
            token_id,
            control_time: timestamp.production_time,
            timestamp: Some(PoeTimestamp::from_timestamp(timestamp)),
        }
    }

    pub fn timestamp_type(&self) -> Option<TimestampType> {
        self.timestamp.as_ref().map(|t| t.timestamp_type)
    }
}
