// vim: tw=80
//! Array-wide configuration toggles: encryption and background services

use crate::{
    config::Mutation,
    job::{ControlBgService, JobMeta, Phase, UpdateEncryption},
    types::*,
};
use super::{JobContext, common};

pub(super) async fn update_encryption(ctx: &JobContext, phase: Phase,
    meta: &mut JobMeta, req: &mut UpdateEncryption) -> Result<()>
{
    match phase {
        Phase::Validate => {
            match req {
                UpdateEncryption::SetMode(SystemEncryptionMode::Invalid) =>
                    Err(Error::InvalidValue),
                _ => Ok(())
            }
        },
        Phase::UpdateInMemory => {
            let m = match req {
                UpdateEncryption::SetMode(mode) =>
                    Mutation::SetSystemEncryptionMode(*mode),
                UpdateEncryption::SetPaused(paused) =>
                    Mutation::SetEncryptionPaused(*paused),
            };
            let tx = common::open_transaction(ctx, meta).await?;
            ctx.config.apply(tx, m).await?;
            Ok(())
        },
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => Ok(()),
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

pub(super) async fn control_bg_service(ctx: &JobContext, phase: Phase,
    meta: &mut JobMeta, req: &mut ControlBgService) -> Result<()>
{
    match phase {
        Phase::Validate => {
            if req.flags.is_valid() {
                Ok(())
            } else {
                Err(Error::InvalidValue)
            }
        },
        Phase::UpdateInMemory => {
            let tx = common::open_transaction(ctx, meta).await?;
            ctx.config.apply(tx, Mutation::SetBgServiceFlags {
                flags: req.flags,
                enable: req.enable,
            }).await?;
            Ok(())
        },
        Phase::Persist => common::commit_transaction(ctx, meta).await,
        Phase::Commit => {
            tracing::info!(job = %meta.job, flags = req.flags.0,
                enable = req.enable, "background services reconfigured");
            Ok(())
        },
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

// LCOV_EXCL_STOP
