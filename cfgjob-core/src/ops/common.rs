// vim: tw=80
//! Phase plumbing shared by every operation family

use crate::{
    job::{JobMeta, Phase},
    types::*,
};
use super::JobContext;

/// Open this job's configuration transaction and park the handle on the
/// record.  At most one transaction may be open per job.
pub(super) async fn open_transaction(ctx: &JobContext, meta: &mut JobMeta)
    -> Result<TransactionId>
{
    debug_assert!(meta.transaction.is_none());
    let tx = ctx.config.start_transaction(meta.job).await?;
    meta.transaction = Some(tx);
    Ok(tx)
}

/// Commit the job's open transaction.  The handle stays on the record if the
/// commit itself fails, so a later rollback still aborts it.
pub(super) async fn commit_transaction(ctx: &JobContext, meta: &mut JobMeta)
    -> Result<()>
{
    let tx = meta.transaction.ok_or(Error::Internal)?;
    ctx.config.commit_transaction(tx).await?;
    meta.transaction = None;
    Ok(())
}

/// The rollback-phase transaction rule.  Three cases:
/// 1. The failed phase never opened a transaction (validate, or an
///    untransacted family): nothing to abort.
/// 2. The failure happened in update_in_memory or persist and the handle is
///    still on the record: abort it, exactly once.
/// 3. The failure happened after the transaction committed (commit-phase
///    barriers): the mutation is durable and must not be undone.
pub(super) async fn abort_if_open(ctx: &JobContext, meta: &mut JobMeta)
    -> Result<()>
{
    match meta.previous_phase {
        Some(Phase::UpdateInMemory) | Some(Phase::Persist) => {
            if let Some(tx) = meta.transaction.take() {
                ctx.config.abort_transaction(tx).await?;
            }
            Ok(())
        },
        _ => Ok(())
    }
}

// LCOV_EXCL_STOP
