// vim: tw=80
//! The operation families
//!
//! Each submodule implements one family as a set of phase handlers over its
//! payload.  Dispatch is a closed match on the payload; adding a family
//! means adding a variant and a submodule, and the compiler finds every
//! match that needs extending.

mod common;
mod drive_connect;
mod extent_pool;
mod lun;
mod ndu_commit;
mod provision_drive;
mod system_config;
mod update_provision_drive;
mod validate_database;

use crate::{
    job::{JobMeta, JobPayload, Phase},
    types::*,
};

#[cfg(test)]
use crate::config::MockConfigClient as ConfigClient;
#[cfg(not(test))]
use crate::config::ConfigClient;
#[cfg(test)]
use crate::topology::MockTopologyClient as TopologyClient;
#[cfg(not(test))]
use crate::topology::TopologyClient;

/// Everything a phase handler may talk to.
pub struct JobContext {
    pub config: ConfigClient,
    pub topology: TopologyClient,
}

/// Run one phase of one job.  The engine owns sequencing; handlers only see
/// the phase they were given.
pub(crate) async fn dispatch(ctx: &JobContext, phase: Phase,
    meta: &mut JobMeta, payload: &mut JobPayload) -> Result<()>
{
    match payload {
        JobPayload::CreateProvisionDrive(req) =>
            provision_drive::create(ctx, phase, meta, req).await,
        JobPayload::DestroyProvisionDrive(req) =>
            provision_drive::destroy(ctx, phase, meta, req).await,
        JobPayload::UpdateProvisionDrive(req) =>
            update_provision_drive::run(ctx, phase, meta, req).await,
        JobPayload::CreateExtentPool(req) =>
            extent_pool::create(ctx, phase, meta, req).await,
        JobPayload::DestroyExtentPool(req) =>
            extent_pool::destroy(ctx, phase, meta, req).await,
        JobPayload::DestroyLun(req) =>
            lun::destroy(ctx, phase, meta, req).await,
        JobPayload::UpdateLun(req) =>
            lun::update(ctx, phase, meta, req).await,
        JobPayload::ConnectDrive(req) =>
            drive_connect::run(ctx, phase, meta, req).await,
        JobPayload::ValidateDatabase(req) =>
            validate_database::run(ctx, phase, meta, req).await,
        JobPayload::UpdateEncryption(req) =>
            system_config::update_encryption(ctx, phase, meta, req).await,
        JobPayload::ControlBgService(req) =>
            system_config::control_bg_service(ctx, phase, meta, req).await,
        JobPayload::NduCommit(req) =>
            ndu_commit::run(ctx, phase, meta, req).await,
    }
}
