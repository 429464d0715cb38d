// vim: tw=80
//! Extent pool creation and destruction
//!
//! A pool is three things in the object graph: the pool object itself, a
//! metadata LUN consuming it, and a pool-id stamp on every member drive.
//! Both operations here touch all three inside one transaction.

use crate::{
    config::Mutation,
    job::{CreateExtentPool, DestroyExtentPool, JobMeta, Phase, WaitForState},
    types::*,
};
use super::{JobContext, common};

/// Widest pool the backend supports.
const MAX_POOL_DRIVES: usize = 256;

/// Private LUN numbers for pool metadata start here; one per pool id.
/// Pool ids above [`MAX_POOL_ID`] would run into the private LUN range.
const METADATA_LUN_BASE: u32 = 0xFE00;

/// Highest pool id the metadata LUN numbering can accommodate.
const MAX_POOL_ID: u32 = 0xFF;

fn metadata_lun_number(pool: PoolId) -> LunNumber {
    LunNumber(METADATA_LUN_BASE + pool.0)
}

pub(super) async fn create(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    req: &mut CreateExtentPool) -> Result<()>
{
    match phase {
        Phase::Validate => validate_create(ctx, req).await,
        Phase::UpdateInMemory => update_create(ctx, meta, req).await,
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => {
            // The pool is usable once its object comes ready; the metadata
            // LUN follows on its own.
            ctx.topology.wait_for_state(meta.object, LifecycleState::Ready,
                DEFAULT_WAIT_TIMEOUT).await
        },
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

async fn validate_create(ctx: &JobContext, req: &CreateExtentPool)
    -> Result<()>
{
    if req.pool == PoolId::INVALID || req.pool.0 > MAX_POOL_ID {
        return Err(Error::InvalidId);
    }
    if req.drives.is_empty() || req.drives.len() > MAX_POOL_DRIVES {
        return Err(Error::InvalidValue);
    }
    match ctx.config.lookup_pool(req.pool).await {
        Ok(_) => return Err(Error::InvalidValue),
        Err(Error::UnknownId) => (),
        Err(e) => return Err(e),
    }
    for drive in &req.drives {
        let info = ctx.config.pvd_info(*drive).await?;
        if info.config_type != PvdConfigType::Unconsumed {
            return Err(Error::PvdInUseForRaidGroup);
        }
    }
    Ok(())
}

async fn update_create(ctx: &JobContext, meta: &mut JobMeta,
    req: &CreateExtentPool) -> Result<()>
{
    let tx = common::open_transaction(ctx, meta).await?;
    let pool_object = ctx.config.apply(tx, Mutation::CreateExtentPool {
        pool: req.pool,
        drives: req.drives.clone(),
    }).await?;
    meta.object = pool_object;
    ctx.config.apply(tx, Mutation::CreateLun {
        lun: metadata_lun_number(req.pool),
        raid_group: pool_object,
        capacity: 0,
    }).await?;
    for drive in &req.drives {
        ctx.config.apply(tx, Mutation::UpdatePvdPoolId {
            object: *drive,
            pool: req.pool,
        }).await?;
        ctx.config.apply(tx, Mutation::UpdatePvdConfigType {
            object: *drive,
            config_type: PvdConfigType::ExtPool,
        }).await?;
    }
    Ok(())
}

pub(super) async fn destroy(ctx: &JobContext, phase: Phase,
    meta: &mut JobMeta, req: &mut DestroyExtentPool) -> Result<()>
{
    match phase {
        Phase::Validate => validate_destroy(ctx, meta, req).await,
        Phase::UpdateInMemory => update_destroy(ctx, meta, req).await,
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

/// The metadata LUN is the pool's only permitted consumer.  Any other
/// upstream edge means user data still lives there.
async fn validate_destroy(ctx: &JobContext, meta: &mut JobMeta,
    req: &DestroyExtentPool) -> Result<()>
{
    let info = ctx.config.lookup_pool(req.pool).await?;
    meta.object = info.object;
    if !info.metadata_lun.is_valid() {
        return Err(Error::Internal);
    }
    if ctx.config.upstream_edge_count(info.object).await? != 1 {
        return Err(Error::HasUpstreamEdges);
    }
    Ok(())
}

async fn update_destroy(ctx: &JobContext, meta: &mut JobMeta,
    req: &DestroyExtentPool) -> Result<()>
{
    let info = ctx.config.lookup_pool(req.pool).await?;
    let members = ctx.config.pool_member_drives(info.object).await?;
    let tx = common::open_transaction(ctx, meta).await?;
    ctx.config.apply(tx, Mutation::DestroyLun(info.metadata_lun)).await?;
    ctx.config.apply(tx, Mutation::DestroyExtentPool(info.object)).await?;
    for drive in members {
        ctx.config.apply(tx, Mutation::UpdatePvdConfigType {
            object: drive,
            config_type: PvdConfigType::Unconsumed,
        }).await?;
        ctx.config.apply(tx, Mutation::UpdatePvdPoolId {
            object: drive,
            pool: PoolId::INVALID,
        }).await?;
    }
    meta.wait = Some(WaitForState {
        state: LifecycleState::NotExist,
        timeout: DEFAULT_WAIT_TIMEOUT,
    });
    Ok(())
}

// LCOV_EXCL_STOP
