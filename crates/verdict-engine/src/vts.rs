//! Validation Time Sliding (VTS)
//!
//! Finds the latest time at which the whole chain of a certificate could
//! still be trusted. Walking from the trust anchor toward the leaf, each
//! certificate narrows the window `[not_before, upper)` where `upper` is the
//! earliest of its expiry, its revocation date (as reported by the latest
//! acceptable revocation object issued before the current control time) and
//! the expiry of its signature algorithms. The supremum of the intersection
//! becomes the control time.

use chrono::{DateTime, Utc};

use verdict_core::{Certificate, Context, Reliability, Result};

use crate::chain::{Block, BlockKind, Chain};
use crate::checks::{VTS_CHAIN_ANCHORED, VTS_WINDOW_INTERSECTS};
use crate::context::ProcessContext;
use crate::crs;

/// Slide the control time of `leaf`'s chain back from `validation_time`
pub fn validate(
    ctx: &ProcessContext<'_>,
    leaf: &Certificate,
    context: Context,
    validation_time: DateTime<Utc>,
) -> Result<Block> {
    let chain = ctx.diagnostic.certificate_chain(&leaf.id, ctx.max_chain_depth)?;
    let anchor = chain.trust_anchor();

    let mut vts = Chain::new(BlockKind::Vts, &leaf.id);
    vts.push(ctx.item(&VTS_CHAIN_ANCHORED, context, None, move || anchor.is_some()));

    let mut control = match anchor.and_then(|a| a.trust_sunset_date) {
        Some(sunset) => sunset.min(validation_time),
        None => validation_time,
    };
    let mut lower: Option<DateTime<Utc>> = None;
    let mut never_reliable = false;

    for certificate in chain.non_anchor().iter().rev() {
        let mut upper = certificate.not_after;

        if !certificate.is_revocation_exempt() {
            let candidates: Vec<_> = ctx
                .diagnostic
                .revocations_for(certificate)?
                .into_iter()
                .filter(|r| r.production_date <= control)
                .collect();

            if !candidates.is_empty() {
                let selection = crs::select(ctx, certificate, &candidates, context, control)?;
                if let Some(revoked_at) = selection
                    .selected
                    .and_then(|r| r.revocation_time(&certificate.id))
                {
                    upper = upper.min(revoked_at);
                }
                vts.push_child(selection.block);
            }
        }

        match ctx.crypto(context).reliability(&certificate.signature) {
            Reliability::Never => never_reliable = true,
            Reliability::Until(expires_at) => upper = upper.min(expires_at),
            Reliability::Always => {}
        }

        lower = Some(lower.map_or(certificate.not_before, |l| l.max(certificate.not_before)));
        control = control.min(upper);
    }

    let intersects = !never_reliable && lower.map_or(true, |l| l <= control);
    let mut window = ctx.item(&VTS_WINDOW_INTERSECTS, context, None, move || intersects);
    if let Some(lower) = lower {
        window = window.with_detail(format!(
            "window [{}, {}]",
            lower.to_rfc3339(),
            control.to_rfc3339()
        ));
    }
    vts.push(window);

    let found = anchor.is_some() && intersects;
    vts.set_control_time(found.then_some(control));
    vts.set_trust_anchor(anchor.map(|a| a.id.clone()));

    Ok(vts.execute())
}
