// vim: tw=80
//! Provision drive attribute updates
//!
//! One family, four sub-types.  Validation is where all the interesting
//! rules live; the update itself is a single mutation.

use crate::{
    config::{Mutation, PvdInfo},
    job::{JobMeta, Phase, PvdUpdate, UpdateProvisionDrive},
    types::*,
};
use super::{JobContext, common};

pub(super) async fn run(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    req: &mut UpdateProvisionDrive) -> Result<()>
{
    match phase {
        Phase::Validate => validate(ctx, meta, req).await,
        Phase::UpdateInMemory => {
            let tx = common::open_transaction(ctx, meta).await?;
            ctx.config.apply(tx, mutation_for(req)).await?;
            Ok(())
        },
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => {
            log_update(meta, req);
            Ok(())
        },
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

async fn validate(ctx: &JobContext, meta: &mut JobMeta,
    req: &UpdateProvisionDrive) -> Result<()>
{
    if !req.object.is_valid() {
        return Err(Error::InvalidId);
    }
    let info = ctx.config.pvd_info(req.object).await?;
    meta.object = info.object;
    match &req.update {
        PvdUpdate::ConfigType(new) =>
            validate_config_type(ctx, &info, *new).await,
        PvdUpdate::SniffVerify(_) => Ok(()),
        PvdUpdate::PoolId(_) => Ok(()),
        PvdUpdate::SerialNumber(serial) => {
            if serial.0.is_empty() {
                return Err(Error::InvalidValue);
            }
            match ctx.config.drive_by_serial(serial.clone()).await? {
                Some(other) if other != req.object =>
                    Err(Error::SerialNumberInUse),
                _ => Ok(())
            }
        },
    }
}

/// The configuration-type transition table.  A no-op transition is rejected
/// with the code naming the type the drive already has, so callers can tell
/// "already what you asked for" apart from a real failure.
async fn validate_config_type(ctx: &JobContext, info: &PvdInfo,
    new: PvdConfigType) -> Result<()>
{
    if new == info.config_type {
        return Err(match info.config_type {
            PvdConfigType::Unconsumed => Error::PvdConfiguredAsUnconsumed,
            PvdConfigType::Raid | PvdConfigType::ExtPool =>
                Error::PvdConfiguredAsRaid,
            PvdConfigType::Spare => Error::PvdConfiguredAsSpare,
            PvdConfigType::Invalid => Error::Internal,
        });
    }
    match new {
        PvdConfigType::Invalid => return Err(Error::InvalidValue),
        PvdConfigType::Spare if info.end_of_life =>
            return Err(Error::PvdEndOfLife),
        _ => ()
    }
    // Releasing a consumed drive requires its RAID group to have let go
    // first.
    let consumed = matches!(info.config_type,
        PvdConfigType::Raid | PvdConfigType::ExtPool);
    let releasing = matches!(new,
        PvdConfigType::Unconsumed | PvdConfigType::Spare);
    if consumed && releasing &&
        ctx.config.upstream_edge_count(info.object).await? > 0
    {
        return Err(Error::PvdInUseForRaidGroup);
    }
    Ok(())
}

fn mutation_for(req: &UpdateProvisionDrive) -> Mutation {
    match &req.update {
        PvdUpdate::ConfigType(ct) => Mutation::UpdatePvdConfigType {
            object: req.object,
            config_type: *ct,
        },
        PvdUpdate::SniffVerify(enabled) => Mutation::UpdatePvdSniffVerify {
            object: req.object,
            enabled: *enabled,
        },
        PvdUpdate::PoolId(pool) => Mutation::UpdatePvdPoolId {
            object: req.object,
            pool: *pool,
        },
        PvdUpdate::SerialNumber(serial) => Mutation::UpdatePvdSerialNumber {
            object: req.object,
            serial: serial.clone(),
        },
    }
}

/// Attribute changes of administrative interest go to the event log.
fn log_update(meta: &JobMeta, req: &UpdateProvisionDrive) {
    match &req.update {
        PvdUpdate::SniffVerify(enabled) => {
            tracing::info!(job = %meta.job, object = %req.object,
                enabled, "sniff verify toggled");
        },
        PvdUpdate::ConfigType(ct) => {
            tracing::info!(job = %meta.job, object = %req.object,
                config_type = ?ct, "drive reconfigured");
        },
        _ => ()
    }
}

// LCOV_EXCL_STOP
