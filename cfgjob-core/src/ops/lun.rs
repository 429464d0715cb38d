// vim: tw=80
//! LUN destruction and attribute updates

use crate::{
    config::Mutation,
    job::{DestroyLun, JobMeta, Phase, UpdateLun, WaitForState},
    types::*,
};
use super::{JobContext, common};

pub(super) async fn destroy(ctx: &JobContext, phase: Phase,
    meta: &mut JobMeta, req: &mut DestroyLun) -> Result<()>
{
    match phase {
        Phase::Validate => validate_destroy(ctx, meta, req).await,
        Phase::UpdateInMemory => {
            let tx = common::open_transaction(ctx, meta).await?;
            ctx.config.apply(tx, Mutation::DestroyLun(meta.object)).await?;
            if req.wait_destroy {
                meta.wait = Some(WaitForState {
                    state: LifecycleState::NotExist,
                    timeout: req.timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT),
                });
            }
            Ok(())
        },
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => {
            match meta.wait {
                Some(w) => ctx.topology
                    .wait_for_state(meta.object, w.state, w.timeout).await,
                None => Ok(())
            }
        },
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

/// While the system database mirror is double degraded, losing one more
/// write could orphan the whole configuration, so LUN destruction is
/// refused.  The exception is cleanup of a LUN whose RAID group is already
/// broken; that can't make matters worse, and the caller must ask for it
/// explicitly.
async fn validate_destroy(ctx: &JobContext, meta: &mut JobMeta,
    req: &DestroyLun) -> Result<()>
{
    let info = ctx.config.lookup_lun(req.lun).await?;
    meta.object = info.object;
    if ctx.config.system_mirror_double_degraded().await? {
        if !req.allow_destroy_broken {
            return Err(Error::DbDriveDoubleDegraded);
        }
        if !ctx.config.raid_group_is_broken(info.raid_group).await? {
            return Err(Error::DbDriveDoubleDegraded);
        }
    }
    Ok(())
}

pub(super) async fn update(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    req: &mut UpdateLun) -> Result<()>
{
    match phase {
        Phase::Validate => validate_update(ctx, meta, req).await,
        Phase::UpdateInMemory => {
            let tx = common::open_transaction(ctx, meta).await?;
            ctx.config.apply(tx, Mutation::UpdateLun {
                object: meta.object,
                wwn: req.wwn,
                attributes: req.attributes,
            }).await?;
            Ok(())
        },
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => Ok(()),
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

async fn validate_update(ctx: &JobContext, meta: &mut JobMeta,
    req: &UpdateLun) -> Result<()>
{
    let info = ctx.config.lookup_lun(req.lun).await?;
    meta.object = info.object;
    if let Some(wwn) = req.wwn {
        match ctx.config.lookup_lun_by_wwn(wwn).await {
            Ok(other) if other.object != info.object =>
                return Err(Error::InvalidValue),
            Ok(_) => (),
            Err(Error::UnknownId) => (),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// LCOV_EXCL_STOP
