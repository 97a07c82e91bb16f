//! Chain engine
//!
//! Every validation process is a [`Chain`] of [`ChainItem`]s. Each item wraps
//! one boolean predicate and the static [`Check`] metadata describing what a
//! failure means. Execution is strictly sequential:
//!
//! - `IGNORE`: the predicate is not run and nothing is recorded
//! - predicate holds: an OK result is recorded
//! - `FAIL`: the conclusion is written once and execution stops
//! - `WARN` / `INFORM`: a message is appended and execution continues
//!
//! A chain that never reaches a `FAIL` concludes `VALID`. Executing a chain
//! consumes it and yields a [`Block`], one node of the validation report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use verdict_core::{Conclusion, Indication, Level, Message, Severity, SubIndication, TokenId};

/// Static metadata of one check
#[derive(Debug)]
pub struct Check {
    /// Key used for policy lookups
    pub key: &'static str,

    /// Message key recorded when the predicate holds
    pub success: &'static str,

    /// Message key recorded when the predicate fails
    pub failure: &'static str,

    /// Outcome written on a `FAIL`-level failure
    pub indication: Indication,
    pub sub_indication: Option<SubIndication>,

    /// Level when the policy is silent
    pub default_level: Level,

    /// Whether the policy may change the level
    pub configurable: bool,
}

/// Kind of report node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    /// Basic validation process
    Basic,
    /// Identification of the signing certificate
    Isc,
    /// Cryptographic verification
    Cv,
    /// Signature acceptance validation
    Sav,
    /// X.509 certificate validation
    Xcv,
    /// Validation of one certificate inside XCV
    SubXcv,
    /// Revocation acceptance checker
    Rac,
    /// Revocation freshness checker
    Rfc,
    /// Certificate revocation selector
    Crs,
    /// Validation time sliding
    Vts,
    /// Past certificate validation
    Pcv,
    /// Past signature validation
    Psv,
}

/// Status of one evaluated check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Failed,
    Warning,
    Information,
}

/// One evaluated check inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub key: &'static str,

    pub status: CheckStatus,

    pub message: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One node of the validation report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,

    pub token_id: TokenId,

    pub checks: Vec<CheckResult>,

    pub conclusion: Conclusion,

    /// Control time established by VTS / used by PCV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_anchor: Option<TokenId>,

    /// Revocation object chosen by CRS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_revocation: Option<TokenId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_signature_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    /// Report node for a token whose validation hit an internal error
    pub fn unexpected_error(kind: BlockKind, token_id: &TokenId, detail: impl Into<String>) -> Self {
        Self {
            kind,
            token_id: token_id.clone(),
            checks: Vec::new(),
            conclusion: Conclusion::unexpected_error(detail),
            control_time: None,
            trust_anchor: None,
            selected_revocation: None,
            best_signature_time: None,
            children: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.conclusion.is_valid()
    }

    pub fn indication(&self) -> Indication {
        self.conclusion.indication
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        self.conclusion.sub_indication
    }

    /// Direct child of a kind
    pub fn child(&self, kind: BlockKind) -> Option<&Block> {
        self.children.iter().find(|b| b.kind == kind)
    }

    /// First block of a kind in depth-first order, including `self`
    pub fn find(&self, kind: BlockKind) -> Option<&Block> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|b| b.find(kind))
    }

    /// Result of a check recorded on this block
    pub fn check(&self, key: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.key == key)
    }
}

/// One step of a chain
pub struct ChainItem<'a> {
    check: &'static Check,
    level: Level,
    indication: Indication,
    sub_indication: Option<SubIndication>,
    detail: Option<String>,
    predicate: Box<dyn FnOnce() -> bool + 'a>,
}

impl<'a> ChainItem<'a> {
    /// Item with the check's own failure outcome
    pub fn new(check: &'static Check, level: Level, predicate: impl FnOnce() -> bool + 'a) -> Self {
        Self {
            check,
            level,
            indication: check.indication,
            sub_indication: check.sub_indication,
            detail: None,
            predicate: Box::new(predicate),
        }
    }

    /// Item that passes when a sub-process concluded `VALID` and otherwise
    /// fails with that sub-process's outcome verbatim
    pub fn forward(check: &'static Check, conclusion: &Conclusion) -> Self {
        let valid = conclusion.is_valid();
        let detail = conclusion.errors().next().map(|m| m.key.clone());
        Self {
            check,
            level: Level::Fail,
            indication: conclusion.indication,
            sub_indication: conclusion.sub_indication,
            detail,
            predicate: Box::new(move || valid),
        }
    }

    /// Override the failure outcome
    pub fn with_outcome(mut self, indication: Indication, sub_indication: Option<SubIndication>) -> Self {
        self.indication = indication;
        self.sub_indication = sub_indication;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn key(&self) -> &'static str {
        self.check.key
    }
}

/// Ordered list of items producing one report node
pub struct Chain<'a> {
    kind: BlockKind,
    token_id: TokenId,
    items: Vec<ChainItem<'a>>,
    children: Vec<Block>,
    control_time: Option<DateTime<Utc>>,
    trust_anchor: Option<TokenId>,
    selected_revocation: Option<TokenId>,
    best_signature_time: Option<DateTime<Utc>>,
}

impl<'a> Chain<'a> {
    pub fn new(kind: BlockKind, token_id: &TokenId) -> Self {
        Self {
            kind,
            token_id: token_id.clone(),
            items: Vec::new(),
            children: Vec::new(),
            control_time: None,
            trust_anchor: None,
            selected_revocation: None,
            best_signature_time: None,
        }
    }

    pub fn push(&mut self, item: ChainItem<'a>) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Attach a sub-process report
    pub fn push_child(&mut self, block: Block) -> &mut Self {
        self.children.push(block);
        self
    }

    pub fn set_control_time(&mut self, control_time: Option<DateTime<Utc>>) {
        self.control_time = control_time;
    }

    pub fn set_trust_anchor(&mut self, trust_anchor: Option<TokenId>) {
        self.trust_anchor = trust_anchor;
    }

    pub fn set_selected_revocation(&mut self, revocation: Option<TokenId>) {
        self.selected_revocation = revocation;
    }

    pub fn set_best_signature_time(&mut self, at: Option<DateTime<Utc>>) {
        self.best_signature_time = at;
    }

    /// Run the items in order and produce the report node
    pub fn execute(self) -> Block {
        let mut checks = Vec::with_capacity(self.items.len());
        let mut messages = Vec::new();
        let mut failure = None;

        for item in self.items {
            if item.level == Level::Ignore {
                trace!(check = item.check.key, "ignored by policy");
                continue;
            }

            let passed = (item.predicate)();
            trace!(check = item.check.key, passed, level = ?item.level, "chain item evaluated");

            if passed {
                checks.push(CheckResult {
                    key: item.check.key,
                    status: CheckStatus::Ok,
                    message: item.check.success,
                    detail: None,
                });
                continue;
            }

            let (status, severity) = match item.level {
                Level::Fail => (CheckStatus::Failed, Severity::Error),
                Level::Warn => (CheckStatus::Warning, Severity::Warning),
                Level::Inform => (CheckStatus::Information, Severity::Info),
                Level::Ignore => continue,
            };

            checks.push(CheckResult {
                key: item.check.key,
                status,
                message: item.check.failure,
                detail: item.detail.clone(),
            });

            let mut message = Message::new(severity, item.check.failure);
            if let Some(detail) = item.detail {
                message = message.with_detail(detail);
            }
            messages.push(message);

            if item.level == Level::Fail {
                debug!(
                    block = ?self.kind,
                    token = %self.token_id,
                    check = item.check.key,
                    indication = %item.indication,
                    sub_indication = ?item.sub_indication,
                    "chain stopped on failing check"
                );
                failure = Some((item.indication, item.sub_indication));
                break;
            }
        }

        let mut conclusion = match failure {
            Some((indication, sub_indication)) => Conclusion::new(indication, sub_indication),
            None => Conclusion::valid(),
        };
        conclusion.messages = messages;

        debug!(
            block = ?self.kind,
            token = %self.token_id,
            indication = %conclusion.indication,
            sub_indication = ?conclusion.sub_indication,
            "chain executed"
        );

        Block {
            kind: self.kind,
            token_id: self.token_id,
            checks,
            conclusion,
            control_time: self.control_time,
            trust_anchor: self.trust_anchor,
            selected_revocation: self.selected_revocation,
            best_signature_time: self.best_signature_time,
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    static FIRST: Check = Check {
        key: "test.first",
        success: "test.first.ok",
        failure: "test.first.ko",
        indication: Indication::Indeterminate,
        sub_indication: Some(SubIndication::TryLater),
        default_level: Level::Fail,
        configurable: true,
    };

    static SECOND: Check = Check {
        key: "test.second",
        success: "test.second.ok",
        failure: "test.second.ko",
        indication: Indication::Invalid,
        sub_indication: Some(SubIndication::HashFailure),
        default_level: Level::Fail,
        configurable: true,
    };

    fn token() -> TokenId {
        TokenId::new("token")
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let block = Chain::new(BlockKind::Basic, &token()).execute();
        assert!(block.is_valid());
        assert!(block.checks.is_empty());
    }

    #[test]
    fn test_first_fail_wins_and_stops() {
        let ran = Cell::new(false);

        let mut chain = Chain::new(BlockKind::Xcv, &token());
        chain
            .push(ChainItem::new(&FIRST, Level::Fail, || false))
            .push(ChainItem::new(&SECOND, Level::Fail, || {
                ran.set(true);
                false
            }));
        let block = chain.execute();

        assert!(!ran.get());
        assert_eq!(block.indication(), Indication::Indeterminate);
        assert_eq!(block.sub_indication(), Some(SubIndication::TryLater));
        assert_eq!(block.checks.len(), 1);
        assert_eq!(block.conclusion.errors().next().map(|m| m.key.as_str()), Some("test.first.ko"));
    }

    #[test]
    fn test_warn_continues_and_keeps_valid() {
        let mut chain = Chain::new(BlockKind::Sav, &token());
        chain
            .push(ChainItem::new(&FIRST, Level::Warn, || false))
            .push(ChainItem::new(&SECOND, Level::Inform, || false));
        let block = chain.execute();

        assert!(block.is_valid());
        assert_eq!(block.conclusion.warnings().count(), 1);
        assert_eq!(block.conclusion.infos().count(), 1);
        assert_eq!(block.checks[0].status, CheckStatus::Warning);
        assert_eq!(block.checks[1].status, CheckStatus::Information);
    }

    #[test]
    fn test_ignore_never_runs_predicate() {
        let ran = Cell::new(false);

        let mut chain = Chain::new(BlockKind::Sav, &token());
        chain.push(ChainItem::new(&FIRST, Level::Ignore, || {
            ran.set(true);
            false
        }));
        let block = chain.execute();

        assert!(!ran.get());
        assert!(block.is_valid());
        assert!(block.checks.is_empty());
        assert!(block.conclusion.messages.is_empty());
    }

    #[test]
    fn test_warnings_before_failure_are_kept() {
        let mut chain = Chain::new(BlockKind::Sav, &token());
        chain
            .push(ChainItem::new(&FIRST, Level::Warn, || false))
            .push(ChainItem::new(&SECOND, Level::Fail, || false));
        let block = chain.execute();

        assert_eq!(block.indication(), Indication::Invalid);
        let keys: Vec<_> = block.conclusion.messages.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["test.first.ko", "test.second.ko"]);
    }

    #[test]
    fn test_forward_copies_sub_process_outcome() {
        let sub = Conclusion::new(Indication::Indeterminate, Some(SubIndication::RevokedNoPoe));

        let mut chain = Chain::new(BlockKind::Basic, &token());
        chain.push(ChainItem::forward(&FIRST, &sub));
        let block = chain.execute();

        assert_eq!(block.indication(), Indication::Indeterminate);
        assert_eq!(block.sub_indication(), Some(SubIndication::RevokedNoPoe));
    }

    #[test]
    fn test_with_outcome_overrides_check_default() {
        let mut chain = Chain::new(BlockKind::Psv, &token());
        chain.push(
            ChainItem::new(&FIRST, Level::Fail, || false)
                .with_outcome(Indication::Indeterminate, Some(SubIndication::OutOfBoundsNoPoe))
                .with_detail("why"),
        );
        let block = chain.execute();

        assert_eq!(block.sub_indication(), Some(SubIndication::OutOfBoundsNoPoe));
        assert_eq!(block.checks[0].detail.as_deref(), Some("why"));
    }

    #[test]
    fn test_find_searches_children() {
        let mut inner = Chain::new(BlockKind::Rfc, &token());
        inner.push(ChainItem::new(&FIRST, Level::Fail, || true));
        let inner = inner.execute();

        let mut outer = Chain::new(BlockKind::Xcv, &token());
        outer.push_child(inner);
        let outer = outer.execute();

        assert!(outer.find(BlockKind::Rfc).is_some());
        assert!(outer.child(BlockKind::Rfc).is_some());
        assert!(outer.find(BlockKind::Psv).is_none());
    }
}
