//! Past Certificate Validation (PCV)

use chrono::{DateTime, Utc};

use verdict_core::{Certificate, Context, Result};

use crate::chain::{Block, BlockKind, Chain, ChainItem};
use crate::checks::PCV_CHAIN_VALID_AT_CONTROL_TIME;
use crate::context::ProcessContext;
use crate::xcv;

/// Re-run chain validation as if "now" were `control_time`
pub fn validate(
    ctx: &ProcessContext<'_>,
    leaf: &Certificate,
    context: Context,
    control_time: DateTime<Utc>,
) -> Result<Block> {
    let chain = xcv::validate(ctx, leaf, context, control_time)?;

    let mut pcv = Chain::new(BlockKind::Pcv, &leaf.id);
    pcv.push(ChainItem::forward(&PCV_CHAIN_VALID_AT_CONTROL_TIME, &chain.conclusion));
    pcv.set_control_time(Some(control_time));
    pcv.set_trust_anchor(chain.trust_anchor.clone());
    pcv.push_child(chain);

    Ok(pcv.execute())
}
