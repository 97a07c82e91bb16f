//! Revocation Freshness Checker (RFC)
//!
//! Maximum accepted age is the policy TTL when one is defined, otherwise
//! `nextUpdate - thisUpdate`. A revocation object is fresh when it was
//! produced no earlier than `validation_time - max_age`.

use chrono::{DateTime, Duration, Utc};

use verdict_core::{Context, RevocationData, SubContext};

use crate::chain::{Block, BlockKind, Chain};
use crate::checks::{RFC_FRESH, RFC_NEXT_UPDATE_PRESENT};
use crate::context::ProcessContext;

/// Maximum accepted age, `None` when neither a TTL nor nextUpdate is available
pub fn max_age(revocation: &RevocationData, ttl: Option<Duration>) -> Option<Duration> {
    ttl.or_else(|| {
        revocation
            .next_update
            .map(|next_update| next_update - revocation.this_update)
    })
}

/// Freshness decision, `None` when it cannot be taken
pub fn is_fresh(revocation: &RevocationData, at: DateTime<Utc>, ttl: Option<Duration>) -> Option<bool> {
    max_age(revocation, ttl).map(|max_age| revocation.production_date >= at - max_age)
}

/// Run the freshness checks of `revocation` at `validation_time`
pub fn check(
    ctx: &ProcessContext<'_>,
    revocation: &RevocationData,
    context: Context,
    sub_context: SubContext,
    validation_time: DateTime<Utc>,
) -> Block {
    let ttl = ctx.policy.revocation_freshness(context, sub_context);
    let mut rfc = Chain::new(BlockKind::Rfc, &revocation.id);

    if ttl.is_none() {
        rfc.push(ctx.item(&RFC_NEXT_UPDATE_PRESENT, context, Some(sub_context), || {
            revocation.next_update.is_some()
        }));
    }

    let mut fresh = ctx.item(&RFC_FRESH, context, Some(sub_context), move || {
        is_fresh(revocation, validation_time, ttl).unwrap_or(false)
    });
    if let Some(max_age) = max_age(revocation, ttl) {
        fresh = fresh.with_detail(format!(
            "produced {} not after {}",
            revocation.production_date.to_rfc3339(),
            (validation_time - max_age).to_rfc3339()
        ));
    }
    rfc.push(fresh);

    rfc.execute()
}
