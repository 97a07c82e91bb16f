//! Proof-of-existence set and comparator
//!
//! POEs accumulate monotonically during a run: timestamps add proofs for the
//! objects they cover, nothing is ever retracted. Every token of the snapshot
//! starts with an implicit proof at the validation time.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{trace, warn};

use verdict_core::{DiagnosticData, Poe, Timestamp, TokenId};

/// Rank of the backing timestamp; a proof without timestamp ranks last
fn type_rank(poe: &Poe) -> u8 {
    match poe.timestamp_type() {
        Some(t) => t as u8,
        None => u8::MAX,
    }
}

/// Strict partial order on proofs of existence
///
/// `a` is before `b` when its control time is earlier; on equal times when
/// its timestamp type is more primitive; on equal types when its timestamp
/// covers a strict subset of the objects covered by `b`'s.
pub fn before(a: &Poe, b: &Poe) -> bool {
    match a.control_time.cmp(&b.control_time) {
        Ordering::Less => return true,
        Ordering::Greater => return false,
        Ordering::Equal => {}
    }

    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Less => return true,
        Ordering::Greater => return false,
        Ordering::Equal => {}
    }

    match (&a.timestamp, &b.timestamp) {
        (Some(ta), Some(tb)) => ta.covers_strict_subset_of(tb),
        _ => false,
    }
}

/// `Less` if `a` is before `b`, `Greater` if after, `Equal` when neither
pub fn compare(a: &Poe, b: &Poe) -> Ordering {
    if before(a, b) {
        Ordering::Less
    } else if before(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// All proofs of existence gathered for one validation run
#[derive(Debug, Clone)]
pub struct PoeSet {
    validation_time: DateTime<Utc>,
    poes: HashMap<TokenId, Vec<Poe>>,
}

impl PoeSet {
    /// Seed every token of the snapshot with a proof at the validation time
    pub fn new(diagnostic: &DiagnosticData, validation_time: DateTime<Utc>) -> Self {
        let poes = diagnostic
            .token_ids()
            .map(|id| (id.clone(), vec![Poe::at_validation_time(id.clone(), validation_time)]))
            .collect();
        Self {
            validation_time,
            poes,
        }
    }

    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    /// Record a proof; proofs later than the validation time are rejected
    pub fn add(&mut self, poe: Poe) -> bool {
        if poe.control_time > self.validation_time {
            warn!(
                token = %poe.token_id,
                control_time = %poe.control_time,
                validation_time = %self.validation_time,
                "Rejecting proof of existence later than the validation time"
            );
            return false;
        }
        trace!(token = %poe.token_id, control_time = %poe.control_time, "proof of existence added");
        self.poes.entry(poe.token_id.clone()).or_default().push(poe);
        true
    }

    /// Add proofs for every object covered by a validated timestamp
    pub fn add_timestamp(&mut self, timestamp: &Timestamp) -> usize {
        let mut added = 0;
        for id in &timestamp.covered {
            if self.add(Poe::from_timestamp(id.clone(), timestamp)) {
                added += 1;
            }
        }
        added
    }

    /// All proofs for a token
    pub fn poes(&self, token_id: &TokenId) -> &[Poe] {
        self.poes.get(token_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a proof for the token exists at or before `at`
    pub fn poe_exists(&self, token_id: &TokenId, at: DateTime<Utc>) -> bool {
        self.poes(token_id).iter().any(|p| p.control_time <= at)
    }

    /// Earliest proof under the comparator
    pub fn lowest_poe(&self, token_id: &TokenId) -> Option<&Poe> {
        self.poes(token_id).iter().fold(None, |lowest, poe| match lowest {
            Some(current) if !before(poe, current) => Some(current),
            _ => Some(poe),
        })
    }

    /// Time of the earliest proof, the validation time for unknown tokens
    pub fn lowest_poe_time(&self, token_id: &TokenId) -> DateTime<Utc> {
        self.lowest_poe(token_id)
            .map_or(self.validation_time, |p| p.control_time)
    }
}
