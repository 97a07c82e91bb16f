//! Past Signature Validation (PSV)
//!
//! Tries to turn a current-time `_NO_POE` conclusion into `VALID` by showing
//! the signature existed at a time when its chain and algorithms were still
//! trustworthy. Every failure either forwards a sub-process verbatim or falls
//! back to the current-time conclusion; PSV never invents a new reason.

use chrono::{DateTime, Utc};

use verdict_core::{Certificate, Conclusion, Context, Indication, Result, SignedToken, SubIndication};

use crate::chain::{Block, BlockKind, Chain, ChainItem};
use crate::checks::{
    PSV_ALGORITHMS_RELIABLE_AT_POE, PSV_BEST_TIME_AFTER_ISSUANCE, PSV_BEST_TIME_BEFORE_EXPIRATION,
    PSV_CONTROL_TIME_FOUND, PSV_PAST_CERTIFICATE_VALID, PSV_POE_BEFORE_CONTROL_TIME,
};
use crate::context::ProcessContext;
use crate::{pcv, vts};

/// Run past signature validation, `None` unless `current` needs a POE
pub fn validate(
    ctx: &ProcessContext<'_>,
    token: &dyn SignedToken,
    signing_certificate: &Certificate,
    context: Context,
    current: &Conclusion,
    sav: &Block,
    validation_time: DateTime<Utc>,
) -> Result<Option<Block>> {
    if !current.requires_poe() {
        return Ok(None);
    }

    let mut psv = Chain::new(BlockKind::Psv, token.id());

    let sliding = vts::validate(ctx, signing_certificate, context, validation_time)?;
    let control_time = sliding.control_time;
    psv.push(ChainItem::forward(&PSV_CONTROL_TIME_FOUND, &sliding.conclusion));
    psv.push_child(sliding);

    let best_signature_time = ctx.poe.lowest_poe_time(token.id());
    let poe_in_time = control_time.map_or(false, |control| best_signature_time <= control);
    psv.push(
        ctx.item(&PSV_POE_BEFORE_CONTROL_TIME, context, None, move || poe_in_time)
            .with_outcome(current.indication, current.sub_indication),
    );

    if poe_in_time {
        let past = pcv::validate(ctx, signing_certificate, context, best_signature_time)?;
        psv.push(ChainItem::forward(&PSV_PAST_CERTIFICATE_VALID, &past.conclusion));
        psv.push_child(past);
    }

    psv.push(ctx.item(&PSV_BEST_TIME_AFTER_ISSUANCE, context, None, move || {
        best_signature_time >= signing_certificate.not_before
    }));

    // Status was known good (or revoked later) so expiry alone is the problem
    let status_known = matches!(
        current.sub_indication,
        Some(
            SubIndication::RevokedNoPoe
                | SubIndication::RevokedCaNoPoe
                | SubIndication::OutOfBoundsNotRevoked
        )
    );
    let out_of_bounds = if status_known {
        SubIndication::OutOfBoundsNotRevoked
    } else {
        SubIndication::OutOfBoundsNoPoe
    };
    psv.push(
        ctx.item(&PSV_BEST_TIME_BEFORE_EXPIRATION, context, None, move || {
            best_signature_time < signing_certificate.not_after
        })
        .with_outcome(Indication::Indeterminate, Some(out_of_bounds)),
    );

    let crypto_originated = current.sub_indication == Some(SubIndication::CryptoConstraintsFailureNoPoe)
        || !sav.is_valid();
    if crypto_originated {
        let crypto = ctx.crypto(context).evaluate(token.signature(), best_signature_time);
        let mut item = ctx.item(&PSV_ALGORITHMS_RELIABLE_AT_POE, context, None, {
            let reliable = crypto.is_ok();
            move || reliable
        });
        if let Err(failure) = crypto {
            item = item.with_detail(failure.to_string());
        }
        psv.push(item);
    }

    psv.set_control_time(control_time);
    psv.set_best_signature_time(Some(best_signature_time));

    Ok(Some(psv.execute()))
}
