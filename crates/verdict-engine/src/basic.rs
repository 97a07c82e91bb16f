//! Basic validation of one signature or timestamp
//!
//! Computes the ISC, XCV, CV and SAV blocks, runs past signature validation
//! when the only obstacle is a `_NO_POE` conclusion, and merges everything
//! into one report node. Hard failures (a broken signature value, a missing
//! signing certificate) are never masked by a conclusion PSV could resolve.

use chrono::{DateTime, Utc};

use verdict_core::{Conclusion, Context, Result, SignedToken};

use crate::chain::{Block, BlockKind, Chain, ChainItem, Check};
use crate::checks::{
    BASIC_CHAIN_CONCLUSIVE, BASIC_CHAIN_NOT_REJECTED, BASIC_CRYPTOGRAPHIC_VERIFICATION,
    BASIC_SIGNATURE_ACCEPTED, BASIC_SIGNATURE_NOT_REJECTED, BASIC_SIGNING_CERTIFICATE_IDENTIFIED,
    CV_REFERENCE_DATA_FOUND, CV_REFERENCE_DATA_INTACT, CV_SIGNATURE_INTACT,
    ISC_SIGNING_CERTIFICATE_DIGEST_MATCH, ISC_SIGNING_CERTIFICATE_IDENTIFIED,
    SAV_ALGORITHMS_ACCEPTABLE, SAV_SIGNING_TIME_PRESENT,
};
use crate::context::ProcessContext;
use crate::{psv, xcv};

/// Item passing when `passed`, otherwise failing with `outcome`
fn gate<'b>(
    ctx: &ProcessContext<'_>,
    check: &'static Check,
    context: Context,
    passed: bool,
    outcome: &Conclusion,
) -> ChainItem<'b> {
    let mut item = ctx
        .item(check, context, None, move || passed)
        .with_outcome(outcome.indication, outcome.sub_indication);
    if let Some(message) = outcome.errors().next() {
        item = item.with_detail(message.key.clone());
    }
    item
}

fn identify_signing_certificate(
    ctx: &ProcessContext<'_>,
    token: &dyn SignedToken,
    context: Context,
    identified: bool,
) -> Block {
    let mut isc = Chain::new(BlockKind::Isc, token.id());
    isc.push(ctx.item(&ISC_SIGNING_CERTIFICATE_IDENTIFIED, context, None, move || identified));
    isc.push(ctx.item(&ISC_SIGNING_CERTIFICATE_DIGEST_MATCH, context, None, || {
        token.signing_certificate_digest_match()
    }));
    isc.execute()
}

fn verify_cryptographically(ctx: &ProcessContext<'_>, token: &dyn SignedToken, context: Context) -> Block {
    let mut cv = Chain::new(BlockKind::Cv, token.id());
    cv.push(ctx.item(&CV_REFERENCE_DATA_FOUND, context, None, || token.reference_data_found()))
        .push(ctx.item(&CV_REFERENCE_DATA_INTACT, context, None, || token.reference_data_intact()))
        .push(ctx.item(&CV_SIGNATURE_INTACT, context, None, || token.signature().intact));
    cv.execute()
}

fn accept_signature(
    ctx: &ProcessContext<'_>,
    token: &dyn SignedToken,
    context: Context,
    validation_time: DateTime<Utc>,
) -> Block {
    let mut sav = Chain::new(BlockKind::Sav, token.id());

    if context == Context::Signature {
        sav.push(ctx.item(&SAV_SIGNING_TIME_PRESENT, context, None, || {
            token.claimed_signing_time().is_some()
        }));
    }

    let crypto = ctx.crypto(context).evaluate(token.signature(), validation_time);
    let mut item = ctx.item(&SAV_ALGORITHMS_ACCEPTABLE, context, None, {
        let acceptable = crypto.is_ok();
        move || acceptable
    });
    if let Err(failure) = crypto {
        item = item.with_detail(failure.to_string());
    }
    sav.push(item);

    sav.execute()
}

/// Run the basic validation process for `token` at `validation_time`
pub fn validate(
    ctx: &ProcessContext<'_>,
    token: &dyn SignedToken,
    context: Context,
    validation_time: DateTime<Utc>,
) -> Result<Block> {
    let signing_certificate = token
        .signing_certificate_id()
        .and_then(|id| ctx.diagnostic.certificate(id));

    let isc = identify_signing_certificate(ctx, token, context, signing_certificate.is_some());
    let chain = signing_certificate
        .map(|certificate| xcv::validate(ctx, certificate, context, validation_time))
        .transpose()?;
    let cv = verify_cryptographically(ctx, token, context);
    let sav = accept_signature(ctx, token, context, validation_time);

    let chain_acceptable = chain
        .as_ref()
        .map_or(false, |b| b.is_valid() || b.conclusion.requires_poe());
    let sav_acceptable = sav.is_valid() || sav.conclusion.requires_poe();

    let past = match (signing_certificate, &chain) {
        (Some(certificate), Some(chain))
            if isc.is_valid()
                && cv.is_valid()
                && chain_acceptable
                && sav_acceptable
                && !(chain.is_valid() && sav.is_valid()) =>
        {
            let current = if chain.is_valid() {
                &sav.conclusion
            } else {
                &chain.conclusion
            };
            psv::validate(ctx, token, certificate, context, current, &sav, validation_time)?
        }
        _ => None,
    };
    let past_valid = past.as_ref().map_or(false, Block::is_valid);

    let mut basic = Chain::new(BlockKind::Basic, token.id());
    basic.push(ChainItem::forward(&BASIC_SIGNING_CERTIFICATE_IDENTIFIED, &isc.conclusion));

    if let Some(chain) = &chain {
        basic.push(gate(ctx, &BASIC_CHAIN_NOT_REJECTED, context, chain_acceptable, &chain.conclusion));
    }
    basic.push(ChainItem::forward(&BASIC_CRYPTOGRAPHIC_VERIFICATION, &cv.conclusion));
    basic.push(gate(ctx, &BASIC_SIGNATURE_NOT_REJECTED, context, sav_acceptable, &sav.conclusion));

    if let Some(chain) = &chain {
        let outcome = past.as_ref().map_or(&chain.conclusion, |b| &b.conclusion);
        basic.push(gate(
            ctx,
            &BASIC_CHAIN_CONCLUSIVE,
            context,
            chain.is_valid() || past_valid,
            outcome,
        ));
    }
    let outcome = past.as_ref().map_or(&sav.conclusion, |b| &b.conclusion);
    basic.push(gate(
        ctx,
        &BASIC_SIGNATURE_ACCEPTED,
        context,
        sav.is_valid() || past_valid,
        outcome,
    ));

    basic.set_best_signature_time(past.as_ref().and_then(|b| b.best_signature_time));
    if let Some(chain) = &chain {
        basic.set_trust_anchor(chain.trust_anchor.clone());
    }

    basic.push_child(isc);
    if let Some(chain) = chain {
        basic.push_child(chain);
    }
    basic.push_child(cv).push_child(sav);
    if let Some(past) = past {
        basic.push_child(past);
    }

    Ok(basic.execute())
}
