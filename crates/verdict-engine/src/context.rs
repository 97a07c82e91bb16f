//! Shared, read-only inputs of a validation run

use verdict_core::{
    Context, CryptographicConstraint, DiagnosticData, Level, SubContext, ValidationPolicy,
};

use crate::chain::{ChainItem, Check};
use crate::poe::PoeSet;

/// How many delegated OCSP responder chains may be validated inside each other
pub const MAX_RESPONDER_NESTING: usize = 2;

/// Everything a validation process may read
///
/// Times are never part of the context; each process receives the time it
/// evaluates at explicitly.
#[derive(Clone, Copy)]
pub struct ProcessContext<'a> {
    pub diagnostic: &'a DiagnosticData,
    pub policy: &'a dyn ValidationPolicy,
    pub poe: &'a PoeSet,
    pub max_chain_depth: usize,
    responder_nesting: usize,
}

impl<'a> ProcessContext<'a> {
    pub fn new(
        diagnostic: &'a DiagnosticData,
        policy: &'a dyn ValidationPolicy,
        poe: &'a PoeSet,
        max_chain_depth: usize,
    ) -> Self {
        Self {
            diagnostic,
            policy,
            poe,
            max_chain_depth,
            responder_nesting: 0,
        }
    }

    /// Context for validating a delegated responder's chain, `None` once
    /// responders vouching for responders nest too deep
    pub fn for_responder(&self) -> Option<Self> {
        (self.responder_nesting < MAX_RESPONDER_NESTING).then(|| Self {
            responder_nesting: self.responder_nesting + 1,
            ..*self
        })
    }

    /// Level of a check: the policy's, else the check's default
    pub fn level(&self, check: &Check, context: Context, sub_context: Option<SubContext>) -> Level {
        if !check.configurable {
            return check.default_level;
        }
        self.policy
            .constraint_level(context, sub_context, check.key)
            .unwrap_or(check.default_level)
    }

    /// Chain item with its level resolved against the policy
    pub fn item<'b>(
        &self,
        check: &'static Check,
        context: Context,
        sub_context: Option<SubContext>,
        predicate: impl FnOnce() -> bool + 'b,
    ) -> ChainItem<'b> {
        ChainItem::new(check, self.level(check, context, sub_context), predicate)
    }

    pub fn crypto(&self, context: Context) -> &'a CryptographicConstraint {
        self.policy.cryptographic_constraint(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use verdict_core::EtsiPolicy;

    #[test]
    fn test_responder_nesting_is_bounded() {
        let data = DiagnosticData::default();
        let policy = EtsiPolicy::default();
        let poe = PoeSet::new(&data, Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap());
        let ctx = ProcessContext::new(&data, &policy, &poe, 8);

        let mut nested = ctx;
        for _ in 0..MAX_RESPONDER_NESTING {
            nested = nested.for_responder().unwrap();
            assert_eq!(nested.max_chain_depth, 8);
        }
        assert!(nested.for_responder().is_none());
        assert!(ctx.for_responder().is_some());
    }
}
