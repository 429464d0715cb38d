// vim: tw=80
//! Upgrade commit
//!
//! After the new software package is running on both controllers, commit
//! makes its on-disk world permanent: the object tables switch to the new
//! schema, private regions grow to the sizes the new release expects, and
//! any private LUN the new release defines gets created.  The schema switch
//! is its own durability point; there is no wrapping transaction for it.

use crate::{
    config::{ExpandStatus, Mutation},
    job::{JobMeta, NduCommit, Phase},
    layout,
    types::*,
};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use super::{JobContext, common};

/// Total wall-clock budget for growing all private regions.  Regions sit
/// busy while their mirrors quiesce around the schema switch, so expansion
/// retries instead of failing outright.
const EXPAND_BUDGET: Duration = Duration::from_secs(120);
const EXPAND_RETRY_INTERVAL: Duration = Duration::from_millis(100);

pub(super) async fn run(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    _req: &mut NduCommit) -> Result<()>
{
    match phase {
        Phase::Validate => Ok(()),
        Phase::UpdateInMemory => commit_upgrade(ctx, meta).await,
        Phase::Persist => {
            match meta.transaction {
                Some(_) => common::commit_transaction(ctx, meta).await,
                None => Ok(())
            }
        },
        Phase::Commit => Ok(()),
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

async fn commit_upgrade(ctx: &JobContext, meta: &mut JobMeta) -> Result<()> {
    ctx.config.commit_object_tables().await?;
    expand_private_regions(ctx).await?;
    create_missing_private_luns(ctx, meta).await
}

/// The budget covers all regions together; one slow region must not grant
/// the next one two minutes of its own.
async fn expand_private_regions(ctx: &JobContext) -> Result<()> {
    let deadline = Instant::now() + EXPAND_BUDGET;
    for region in layout::private_regions() {
        loop {
            match ctx.config
                .expand_raid_group(region.raid_group, region.capacity).await?
            {
                ExpandStatus::Completed => break,
                ExpandStatus::Busy => {
                    if Instant::now() + EXPAND_RETRY_INTERVAL > deadline {
                        tracing::warn!(raid_group = %region.raid_group,
                            "private region expansion exhausted its budget");
                        return Err(Error::Timeout);
                    }
                    sleep(EXPAND_RETRY_INTERVAL).await;
                },
            }
        }
    }
    Ok(())
}

/// LUNs defined by the new release but absent from the database get created
/// in a transaction of their own, committed by the persist phase.
async fn create_missing_private_luns(ctx: &JobContext, meta: &mut JobMeta)
    -> Result<()>
{
    let mut missing = Vec::new();
    for pl in layout::private_luns() {
        match ctx.config.lookup_lun(pl.lun).await {
            Ok(_) => (),
            Err(Error::UnknownId) => missing.push(*pl),
            Err(e) => return Err(e),
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    let tx = common::open_transaction(ctx, meta).await?;
    for pl in missing {
        ctx.config.apply(tx, Mutation::CreateLun {
            lun: pl.lun,
            raid_group: pl.raid_group,
            capacity: pl.capacity,
        }).await?;
    }
    Ok(())
}

// LCOV_EXCL_STOP
