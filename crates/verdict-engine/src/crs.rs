//! Certificate Revocation Selector (CRS)
//!
//! Runs RAC over every candidate revocation object of a certificate and
//! selects the accepted one with the latest production date. Ties go to OCSP
//! over CRL, then to the lowest identifier.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use verdict_core::{Certificate, Context, Result, RevocationData};

use crate::chain::{Block, BlockKind, Chain};
use crate::checks::{CRS_ACCEPTABLE_FOUND, CRS_CANDIDATES_PRESENT};
use crate::context::ProcessContext;
use crate::rac;

/// Outcome of a selection
pub struct Selection<'a> {
    pub block: Block,
    pub selected: Option<&'a RevocationData>,
}

/// Which of two accepted revocation objects CRS prefers
fn preference(a: &RevocationData, b: &RevocationData) -> Ordering {
    a.production_date
        .cmp(&b.production_date)
        .then_with(|| b.kind.cmp(&a.kind))
        .then_with(|| b.id.cmp(&a.id))
}

/// Select the latest acceptable revocation object for `certificate`
pub fn select<'a>(
    ctx: &ProcessContext<'_>,
    certificate: &Certificate,
    candidates: &[&'a RevocationData],
    context: Context,
    validation_time: DateTime<Utc>,
) -> Result<Selection<'a>> {
    let mut crs = Chain::new(BlockKind::Crs, &certificate.id);

    let mut accepted = Vec::new();
    for revocation in candidates {
        let rac = rac::check(ctx, certificate, revocation, validation_time)?;
        if rac.is_valid() {
            accepted.push(*revocation);
        }
        crs.push_child(rac);
    }

    let selected = accepted.into_iter().max_by(|a, b| preference(a, b));

    let has_candidates = !candidates.is_empty();
    crs.push(ctx.item(&CRS_CANDIDATES_PRESENT, context, None, move || has_candidates));
    crs.push(ctx.item(&CRS_ACCEPTABLE_FOUND, context, None, move || selected.is_some()));
    crs.set_selected_revocation(selected.map(|r| r.id.clone()));

    Ok(Selection {
        block: crs.execute(),
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poe::PoeSet;
    use chrono::TimeZone;
    use verdict_core::{DiagnosticData, EtsiPolicy, RevocationKind, SignatureInfo, SubIndication};

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn leaf() -> Certificate {
        Certificate::builder("leaf")
            .issuer("ca")
            .validity(date(2020, 1, 1), date(2023, 1, 1))
            .build()
            .unwrap()
    }

    fn ocsp(id: &str, produced: DateTime<Utc>) -> RevocationData {
        RevocationData::ocsp(id)
            .signer("ca")
            .produced_at(produced)
            .good("leaf")
            .build()
            .unwrap()
    }

    fn with_ctx<R>(f: impl FnOnce(&ProcessContext<'_>) -> R) -> R {
        let ca = Certificate::builder("ca")
            .validity(date(2010, 1, 1), date(2040, 1, 1))
            .self_signed()
            .trusted()
            .ca()
            .build()
            .unwrap();
        let data = DiagnosticData::builder().certificate(ca).build().unwrap();
        let policy = EtsiPolicy::default();
        let poe = PoeSet::new(&data, date(2021, 6, 1));
        let ctx = ProcessContext::new(&data, &policy, &poe, 8);
        f(&ctx)
    }

    fn pick<'a>(ctx: &ProcessContext<'_>, candidates: &[&'a RevocationData]) -> Selection<'a> {
        select(ctx, &leaf(), candidates, Context::Signature, date(2021, 6, 1)).unwrap()
    }

    #[test]
    fn test_latest_acceptable_wins() {
        let old = ocsp("old", date(2021, 1, 1));
        let new = ocsp("new", date(2021, 5, 1));
        let mut broken = ocsp("broken", date(2021, 5, 30));
        broken.signature = SignatureInfo::default().broken();

        with_ctx(|ctx| {
            let selection = pick(ctx, &[&old, &broken, &new]);
            assert_eq!(selection.selected.map(|r| r.id.as_str()), Some("new"));
            assert_eq!(selection.block.children.len(), 3);
            assert_eq!(selection.block.selected_revocation.as_ref().map(|id| id.as_str()), Some("new"));
            assert!(selection.block.is_valid());
        });
    }

    #[test]
    fn test_no_candidates_vs_none_acceptable() {
        let mut broken = ocsp("broken", date(2021, 5, 30));
        broken.signature = SignatureInfo::default().broken();

        with_ctx(|ctx| {
            let empty = pick(ctx, &[]);
            assert!(empty.selected.is_none());
            assert_eq!(empty.block.sub_indication(), Some(SubIndication::TryLater));

            let rejected = pick(ctx, &[&broken]);
            assert!(rejected.selected.is_none());
            assert_eq!(
                rejected.block.sub_indication(),
                Some(SubIndication::CertificateChainGeneralFailure)
            );
        });
    }

    #[test]
    fn test_tie_prefers_ocsp_then_lowest_id() {
        let at = date(2021, 5, 1);
        let crl = RevocationData::crl("a-crl")
            .signer("ca")
            .this_update(at)
            .next_update(date(2021, 6, 1))
            .good("leaf")
            .build()
            .unwrap();
        let ocsp_b = ocsp("b-ocsp", at);
        let ocsp_c = ocsp("c-ocsp", at);

        with_ctx(|ctx| {
            let selection = pick(ctx, &[&crl, &ocsp_c, &ocsp_b]);
            let selected = selection.selected.unwrap();
            assert_eq!(selected.kind, RevocationKind::Ocsp);
            assert_eq!(selected.id.as_str(), "b-ocsp");
        });
    }
}
