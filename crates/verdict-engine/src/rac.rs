//! Revocation Acceptance Checker (RAC)
//!
//! Decides whether one revocation object may be used for one certificate.
//! A delegated OCSP responder is trusted only through its own chain, which
//! is validated here in the revocation context.

use chrono::{DateTime, Utc};

use verdict_core::{Certificate, Context, ExtendedKeyUsage, RevocationData, RevocationKind, Result};

use crate::chain::{Block, BlockKind, Chain, ChainItem};
use crate::checks::{
    RAC_CERTIFICATE_STATUS_KNOWN, RAC_CRYPTO_ACCEPTABLE, RAC_ISSUER_KNOWS_CERTIFICATE,
    RAC_ISSUER_MATCHES, RAC_PRODUCED_AFTER_ISSUANCE, RAC_RESPONDER_CHAIN_VALID,
    RAC_SIGNATURE_INTACT, RAC_SIGNER_VALID_AT_PRODUCTION,
};
use crate::context::ProcessContext;
use crate::xcv;

/// Delegated OCSP responder of `revocation`, if it is one
///
/// A responder is delegated when it is not the certificate's issuer but was
/// issued by it and carries the OCSP-signing extended key usage.
pub fn delegated_responder<'a>(
    ctx: &ProcessContext<'a>,
    certificate: &Certificate,
    revocation: &RevocationData,
) -> Option<&'a Certificate> {
    let (Some(signer_id), Some(issuer_id)) = (&revocation.signer_id, &certificate.issuer_id) else {
        return None;
    };
    if revocation.kind != RevocationKind::Ocsp || signer_id == issuer_id {
        return None;
    }

    ctx.diagnostic.certificate(signer_id).filter(|responder| {
        responder.issuer_id.as_ref() == Some(issuer_id)
            && responder.has_extended_key_usage(ExtendedKeyUsage::OcspSigning)
    })
}

/// Whether the revocation object was signed by the certificate's issuer or by
/// an OCSP responder the issuer delegated to
pub fn issued_by_certificate_issuer(
    ctx: &ProcessContext<'_>,
    certificate: &Certificate,
    revocation: &RevocationData,
) -> bool {
    match (&revocation.signer_id, &certificate.issuer_id) {
        (Some(signer_id), Some(issuer_id)) if signer_id == issuer_id => true,
        _ => delegated_responder(ctx, certificate, revocation).is_some(),
    }
}

/// Whether the OCSP signer certificate covers `producedAt`; CRLs are signed
/// by the issuer, which the enclosing chain already validates
fn signer_valid_at_production(ctx: &ProcessContext<'_>, revocation: &RevocationData) -> bool {
    if revocation.kind != RevocationKind::Ocsp {
        return true;
    }
    revocation
        .signer_id
        .as_ref()
        .and_then(|id| ctx.diagnostic.certificate(id))
        .map_or(false, |signer| {
            signer.not_before <= revocation.production_date && revocation.production_date <= signer.not_after
        })
}

/// Run the acceptance checks of `revocation` for `certificate`
pub fn check(
    ctx: &ProcessContext<'_>,
    certificate: &Certificate,
    revocation: &RevocationData,
    validation_time: DateTime<Utc>,
) -> Result<Block> {
    let context = Context::Revocation;
    let mut rac = Chain::new(BlockKind::Rac, &revocation.id);

    rac.push(ctx.item(&RAC_CERTIFICATE_STATUS_KNOWN, context, None, || {
        revocation.covers(&certificate.id)
    }));

    rac.push(ctx.item(&RAC_ISSUER_MATCHES, context, None, || {
        issued_by_certificate_issuer(ctx, certificate, revocation)
    }));

    rac.push(ctx.item(&RAC_SIGNATURE_INTACT, context, None, || revocation.signature.intact));

    rac.push(ctx.item(&RAC_PRODUCED_AFTER_ISSUANCE, context, None, || {
        revocation.production_date >= certificate.not_before
    }));

    rac.push(
        ctx.item(&RAC_ISSUER_KNOWS_CERTIFICATE, context, None, || {
            revocation.knows_certificate(certificate)
        })
        .with_detail(format!(
            "certificate expires {}, issuer keeps expired certificates from {}",
            certificate.not_after.to_rfc3339(),
            revocation.expired_certificates_limit().to_rfc3339()
        )),
    );

    rac.push(ctx.item(&RAC_SIGNER_VALID_AT_PRODUCTION, context, None, || {
        signer_valid_at_production(ctx, revocation)
    }));

    if let Some(responder) = delegated_responder(ctx, certificate, revocation) {
        match ctx.for_responder() {
            Some(nested) => {
                let chain = xcv::validate(&nested, responder, context, validation_time)?;
                rac.push(ChainItem::forward(&RAC_RESPONDER_CHAIN_VALID, &chain.conclusion));
                rac.push_child(chain);
            }
            None => {
                rac.push(
                    ctx.item(&RAC_RESPONDER_CHAIN_VALID, context, None, || false)
                        .with_detail("delegated responders nested too deep"),
                );
            }
        }
    }

    let crypto = ctx
        .crypto(context)
        .evaluate(&revocation.signature, revocation.production_date);
    let mut item = ctx.item(&RAC_CRYPTO_ACCEPTABLE, context, None, {
        let acceptable = crypto.is_ok();
        move || acceptable
    });
    if let Err(failure) = crypto {
        item = item.with_detail(failure.to_string());
    }
    rac.push(item);

    Ok(rac.execute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poe::PoeSet;
    use chrono::TimeZone;
    use verdict_core::{
        DiagnosticData, DigestAlgorithm, EncryptionAlgorithm, EtsiPolicy, Indication, KeyUsage,
        SignatureInfo, SubIndication,
    };

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn ca() -> Certificate {
        Certificate::builder("ca")
            .validity(date(2010, 1, 1), date(2040, 1, 1))
            .self_signed()
            .trusted()
            .ca()
            .build()
            .unwrap()
    }

    fn leaf() -> Certificate {
        Certificate::builder("leaf")
            .issuer("ca")
            .validity(date(2020, 1, 1), date(2023, 1, 1))
            .build()
            .unwrap()
    }

    fn responder(eku: bool) -> verdict_core::CertificateBuilder {
        let mut builder = Certificate::builder("responder")
            .issuer("ca")
            .validity(date(2020, 1, 1), date(2023, 1, 1))
            .key_usage(KeyUsage::DigitalSignature)
            .ocsp_no_check();
        if eku {
            builder = builder.extended_key_usage(ExtendedKeyUsage::OcspSigning);
        }
        builder
    }

    fn snapshot(responder: Option<Certificate>) -> DiagnosticData {
        let mut builder = DiagnosticData::builder().certificate(ca());
        if let Some(responder) = responder {
            builder = builder.certificate(responder);
        }
        builder.build().unwrap()
    }

    fn ocsp(signer: &str, produced: DateTime<Utc>) -> RevocationData {
        RevocationData::ocsp("ocsp")
            .signer(signer)
            .produced_at(produced)
            .good("leaf")
            .build()
            .unwrap()
    }

    fn run(data: &DiagnosticData, revocation: &RevocationData) -> Block {
        let policy = EtsiPolicy::default();
        let poe = PoeSet::new(data, date(2021, 6, 1));
        let ctx = ProcessContext::new(data, &policy, &poe, 8);
        check(&ctx, &leaf(), revocation, date(2021, 6, 1)).unwrap()
    }

    #[test]
    fn test_issuer_signed_ocsp_accepted() {
        let block = run(&snapshot(None), &ocsp("ca", date(2021, 6, 1)));
        assert!(block.is_valid(), "{:?}", block.conclusion);
        assert_eq!(block.checks.len(), 7);
        assert!(block.children.is_empty());
    }

    #[test]
    fn test_delegated_responder_needs_ocsp_signing() {
        let revocation = ocsp("responder", date(2021, 6, 1));

        let with_eku = snapshot(Some(responder(true).build().unwrap()));
        let block = run(&with_eku, &revocation);
        assert!(block.is_valid(), "{:?}", block.conclusion);
        assert!(block.child(BlockKind::Xcv).is_some());

        let without_eku = snapshot(Some(responder(false).build().unwrap()));
        let block = run(&without_eku, &revocation);
        assert_eq!(block.indication(), Indication::Indeterminate);
        assert!(block.check(RAC_ISSUER_MATCHES.key).is_some());
    }

    #[test]
    fn test_expired_responder_rejected() {
        let expired = responder(true)
            .validity(date(2015, 1, 1), date(2016, 1, 1))
            .build()
            .unwrap();
        let block = run(&snapshot(Some(expired)), &ocsp("responder", date(2021, 6, 1)));

        assert!(!block.is_valid());
        assert!(block
            .conclusion
            .errors()
            .any(|m| m.key == RAC_SIGNER_VALID_AT_PRODUCTION.failure));
    }

    #[test]
    fn test_responder_with_broken_signature_rejected() {
        let broken = responder(true)
            .signature(SignatureInfo::default().broken())
            .build()
            .unwrap();
        let block = run(&snapshot(Some(broken)), &ocsp("responder", date(2021, 6, 1)));

        assert!(!block.is_valid());
        assert_eq!(block.sub_indication(), Some(SubIndication::CertificateChainGeneralFailure));
        let chain = block.child(BlockKind::Xcv).unwrap();
        assert!(!chain.is_valid());
    }

    #[test]
    fn test_missing_status_rejected() {
        let revocation = RevocationData::ocsp("ocsp")
            .signer("ca")
            .produced_at(date(2021, 6, 1))
            .good("someone-else")
            .build()
            .unwrap();

        let block = run(&snapshot(None), &revocation);
        assert!(!block.is_valid());
        assert_eq!(block.checks.len(), 1);
    }

    #[test]
    fn test_produced_before_issuance_rejected() {
        let crl = RevocationData::crl("crl")
            .signer("ca")
            .this_update(date(2019, 6, 1))
            .next_update(date(2019, 7, 1))
            .good("leaf")
            .build()
            .unwrap();

        let block = run(&snapshot(None), &crl);
        assert!(!block.is_valid());
        assert!(block.conclusion.errors().any(|m| m.key == RAC_PRODUCED_AFTER_ISSUANCE.failure));
    }

    #[test]
    fn test_crl_after_expiry_does_not_vouch_for_certificate() {
        let late = RevocationData::crl("crl")
            .signer("ca")
            .this_update(date(2023, 6, 1))
            .next_update(date(2023, 7, 1))
            .good("leaf")
            .build()
            .unwrap();
        let block = run(&snapshot(None), &late);
        assert!(!block.is_valid());
        assert!(block
            .conclusion
            .errors()
            .any(|m| m.key == RAC_ISSUER_KNOWS_CERTIFICATE.failure));

        let keeps_expired = RevocationData::crl("crl")
            .signer("ca")
            .this_update(date(2023, 6, 1))
            .next_update(date(2023, 7, 1))
            .expired_certs_on_crl(date(2020, 1, 1))
            .good("leaf")
            .build()
            .unwrap();
        assert!(run(&snapshot(None), &keeps_expired).is_valid());
    }

    #[test]
    fn test_weak_revocation_signature_rejected() {
        let revocation = RevocationData::ocsp("ocsp")
            .signer("ca")
            .produced_at(date(2021, 6, 1))
            .signature(SignatureInfo::new(DigestAlgorithm::Md5, EncryptionAlgorithm::Rsa, 2048))
            .good("leaf")
            .build()
            .unwrap();

        let block = run(&snapshot(None), &revocation);
        let result = block.check(RAC_CRYPTO_ACCEPTABLE.key).unwrap();
        assert!(result.detail.as_deref().unwrap_or_default().contains("Md5"));
    }
}
