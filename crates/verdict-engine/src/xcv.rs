//! X.509 Certificate Validation (XCV)
//!
//! Builds the prospective chain of a signing certificate and validates every
//! certificate below the trust anchor at a given time. The leaf is checked in
//! the `SIGNING_CERT` sub-context, every other certificate as
//! `CA_CERTIFICATE`. A revoked certificate is never a hard failure here: it
//! yields `INDETERMINATE / REVOKED_NO_POE` (or `REVOKED_CA_NO_POE`) so that
//! past signature validation can look for an earlier proof of existence.

use chrono::{DateTime, Utc};

use verdict_core::{
    Certificate, Context, Indication, KeyUsage, Result, SubContext, SubIndication,
};

use crate::chain::{Block, BlockKind, Chain, ChainItem};
use crate::checks::{
    XCV_ACCEPTABLE_REVOCATION_FOUND, XCV_CA_BASIC_CONSTRAINTS, XCV_CA_KEY_CERT_SIGN,
    XCV_CERTIFICATE_SIGNATURE_INTACT, XCV_CERTIFICATE_VALID, XCV_CRYPTO_ACCEPTABLE,
    XCV_IN_VALIDITY_RANGE, XCV_NOT_ON_HOLD, XCV_NOT_REVOKED, XCV_PROSPECTIVE_CHAIN_FOUND,
    XCV_REVOCATION_DATA_AVAILABLE, XCV_REVOCATION_FRESH, XCV_SIGNING_CERTIFICATE_KEY_USAGE,
    XCV_TRUST_ANCHOR_NOT_SUNSET,
};
use crate::context::ProcessContext;
use crate::{crs, rfc};

/// Validate the chain of `leaf` as of `validation_time`
pub fn validate(
    ctx: &ProcessContext<'_>,
    leaf: &Certificate,
    context: Context,
    validation_time: DateTime<Utc>,
) -> Result<Block> {
    let chain = ctx.diagnostic.certificate_chain(&leaf.id, ctx.max_chain_depth)?;
    let anchor = chain.trust_anchor();

    let mut xcv = Chain::new(BlockKind::Xcv, &leaf.id);
    xcv.push(
        ctx.item(&XCV_PROSPECTIVE_CHAIN_FOUND, context, None, move || anchor.is_some())
            .with_detail(format!("chain building stopped: {:?}", chain.termination())),
    );

    if let Some(anchor) = anchor {
        xcv.push(ctx.item(&XCV_TRUST_ANCHOR_NOT_SUNSET, context, None, move || {
            anchor
                .trust_sunset_date
                .map_or(true, |sunset| validation_time <= sunset)
        }));
        xcv.set_trust_anchor(Some(anchor.id.clone()));
    }

    for (index, certificate) in chain.non_anchor().iter().enumerate() {
        let sub_context = if index == 0 {
            SubContext::SigningCert
        } else {
            SubContext::CaCertificate
        };
        let issuer_located = chain.issuer_of(index).is_some();

        let sub = validate_certificate(
            ctx,
            certificate,
            issuer_located,
            context,
            sub_context,
            validation_time,
        )?;
        xcv.push(ChainItem::forward(&XCV_CERTIFICATE_VALID, &sub.conclusion));
        xcv.push_child(sub);
    }

    Ok(xcv.execute())
}

/// Sub-XCV: validate one certificate of the chain
fn validate_certificate(
    ctx: &ProcessContext<'_>,
    certificate: &Certificate,
    issuer_located: bool,
    context: Context,
    sub_context: SubContext,
    validation_time: DateTime<Utc>,
) -> Result<Block> {
    let level_key = Some(sub_context);
    let mut sub = Chain::new(BlockKind::SubXcv, &certificate.id);

    sub.push(ctx.item(&XCV_CERTIFICATE_SIGNATURE_INTACT, context, level_key, || {
        certificate.signature.intact && issuer_located
    }));

    match sub_context {
        SubContext::SigningCert => {
            let accepted = ctx.policy.accepted_key_usages(context);
            sub.push(ctx.item(&XCV_SIGNING_CERTIFICATE_KEY_USAGE, context, level_key, move || {
                accepted.iter().any(|usage| certificate.has_key_usage(*usage))
            }));
        }
        SubContext::CaCertificate => {
            sub.push(ctx.item(&XCV_CA_BASIC_CONSTRAINTS, context, level_key, || certificate.ca));
            sub.push(ctx.item(&XCV_CA_KEY_CERT_SIGN, context, level_key, || {
                certificate.has_key_usage(KeyUsage::KeyCertSign)
            }));
        }
    }

    // Revocation is selected up front: an expired certificate still reported
    // good after expiry is OUT_OF_BOUNDS_NOT_REVOKED rather than NO_POE
    let revocation_required = !certificate.is_revocation_exempt();
    let candidates = if revocation_required {
        ctx.diagnostic.revocations_for(certificate)?
    } else {
        Vec::new()
    };
    let selection = if candidates.is_empty() {
        None
    } else {
        Some(crs::select(ctx, certificate, &candidates, context, validation_time)?)
    };
    let selected = selection.as_ref().and_then(|s| s.selected);

    let expired_not_revoked = selected.map_or(false, |revocation| {
        validation_time >= certificate.not_after
            && revocation.production_date >= certificate.not_after
            && revocation.is_good(&certificate.id)
    });
    let out_of_bounds = if expired_not_revoked {
        SubIndication::OutOfBoundsNotRevoked
    } else {
        SubIndication::OutOfBoundsNoPoe
    };
    sub.push(
        ctx.item(&XCV_IN_VALIDITY_RANGE, context, level_key, move || {
            certificate.is_valid_at(validation_time)
        })
        .with_outcome(Indication::Indeterminate, Some(out_of_bounds)),
    );

    let crypto = ctx
        .crypto(context)
        .evaluate(&certificate.signature, validation_time);
    let mut crypto_item = ctx.item(&XCV_CRYPTO_ACCEPTABLE, context, level_key, {
        let acceptable = crypto.is_ok();
        move || acceptable
    });
    if let Err(failure) = crypto {
        crypto_item = crypto_item.with_detail(failure.to_string());
    }
    sub.push(crypto_item);

    if revocation_required {
        let available = !candidates.is_empty();
        sub.push(ctx.item(&XCV_REVOCATION_DATA_AVAILABLE, context, level_key, move || available));

        if let Some(selection) = selection {
            sub.push(ChainItem::forward(
                &XCV_ACCEPTABLE_REVOCATION_FOUND,
                &selection.block.conclusion,
            ));
            sub.push_child(selection.block);
        }

        if let Some(revocation) = selected {
            let freshness = rfc::check(ctx, revocation, context, sub_context, validation_time);
            sub.push(ChainItem::forward(&XCV_REVOCATION_FRESH, &freshness.conclusion));
            sub.push_child(freshness);

            let revoked = match sub_context {
                SubContext::SigningCert => SubIndication::RevokedNoPoe,
                SubContext::CaCertificate => SubIndication::RevokedCaNoPoe,
            };
            let mut not_revoked = ctx
                .item(&XCV_NOT_REVOKED, context, level_key, move || {
                    revocation
                        .revocation_time(&certificate.id)
                        .map_or(true, |revoked_at| revoked_at > validation_time)
                })
                .with_outcome(Indication::Indeterminate, Some(revoked));
            if let Some(revoked_at) = revocation.revocation_time(&certificate.id) {
                not_revoked = not_revoked.with_detail(format!("revoked at {}", revoked_at.to_rfc3339()));
            }
            sub.push(not_revoked);

            sub.push(ctx.item(&XCV_NOT_ON_HOLD, context, level_key, move || {
                revocation
                    .hold_time(&certificate.id)
                    .map_or(true, |held_at| held_at > validation_time)
            }));
        }
    }

    Ok(sub.execute())
}
