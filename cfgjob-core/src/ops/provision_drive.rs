// vim: tw=80
//! Provision drive creation and destruction

use crate::{
    config::Mutation,
    job::{CreateProvisionDrive, DestroyProvisionDrive, JobMeta, Phase},
    layout,
    types::*,
};
use super::{JobContext, common};

pub(super) async fn create(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    req: &mut CreateProvisionDrive) -> Result<()>
{
    match phase {
        Phase::Validate => validate_create(ctx, req).await,
        Phase::UpdateInMemory => update_create(ctx, meta, req).await,
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => commit_create(ctx, req).await,
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

/// Candidates whose serial number is already in the database are re-creation
/// attempts, not errors.  Mark them invalid and keep going; a batch may
/// legitimately end up all-invalid.
async fn validate_create(ctx: &JobContext, req: &mut CreateProvisionDrive)
    -> Result<()>
{
    if req.drives.is_empty() {
        return Err(Error::InvalidValue);
    }
    for dc in req.drives.iter_mut() {
        if dc.serial.0.is_empty() {
            return Err(Error::InvalidValue);
        }
        if ctx.config.drive_by_serial(dc.serial.clone()).await?.is_some() {
            dc.valid = false;
        }
    }
    Ok(())
}

async fn update_create(ctx: &JobContext, meta: &mut JobMeta,
    req: &mut CreateProvisionDrive) -> Result<()>
{
    let tx = common::open_transaction(ctx, meta).await?;
    for dc in req.drives.iter_mut().filter(|dc| dc.valid) {
        let object = ctx.config.apply(tx, Mutation::CreateProvisionDrive {
            location: dc.location,
            serial: dc.serial.clone(),
            config_type: dc.config_type,
            capacity: dc.capacity,
            block_size: dc.block_size,
        }).await?;
        dc.object = Some(object);
        if !meta.object.is_valid() {
            meta.object = object;
        }
    }
    Ok(())
}

/// If the batch created any system drive, the raw mirror that backs the
/// configuration database must pick up its new edges inside a quiesce
/// window.  The window must close even when reinitialization fails.
async fn commit_create(ctx: &JobContext, req: &CreateProvisionDrive)
    -> Result<()>
{
    let touched_system_drive = req.drives.iter()
        .any(|dc| dc.object.is_some() && layout::is_system_drive(&dc.location));
    if !touched_system_drive {
        return Ok(());
    }
    ctx.topology.quiesce_raw_mirror().await?;
    let r = ctx.topology.reinitialize_raw_mirror_edges().await;
    let unq = ctx.topology.unquiesce_raw_mirror().await;
    r.and(unq)
}

pub(super) async fn destroy(ctx: &JobContext, phase: Phase,
    meta: &mut JobMeta, req: &mut DestroyProvisionDrive) -> Result<()>
{
    match phase {
        Phase::Validate => validate_destroy(ctx, meta, req).await,
        Phase::UpdateInMemory => {
            let tx = common::open_transaction(ctx, meta).await?;
            ctx.config.apply(tx, Mutation::DestroyProvisionDrive(req.object))
                .await?;
            Ok(())
        },
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => Ok(()),
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

async fn validate_destroy(ctx: &JobContext, meta: &mut JobMeta,
    req: &DestroyProvisionDrive) -> Result<()>
{
    if !req.object.is_valid() {
        return Err(Error::InvalidId);
    }
    let info = ctx.config.pvd_info(req.object).await?;
    meta.object = info.object;
    if ctx.config.upstream_edge_count(req.object).await? > 0 {
        return Err(Error::HasUpstreamEdges);
    }
    Ok(())
}

// LCOV_EXCL_STOP
