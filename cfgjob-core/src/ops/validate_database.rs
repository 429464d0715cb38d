// vim: tw=80
//! On-demand consistency checks of the configuration database

use crate::{
    job::{JobMeta, Phase, ValidateDatabase},
    types::*,
};
use super::{JobContext, common};

pub(super) async fn run(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    req: &mut ValidateDatabase) -> Result<()>
{
    match phase {
        Phase::Validate => {
            // End users may always ask.  Internal callers (peer boot,
            // upgrade commit) defer to the service, which refuses while a
            // validation would race with other recovery.
            if req.caller != ValidateCaller::User &&
                !ctx.config.validation_allowed(req.caller).await?
            {
                return Err(Error::InvalidValue);
            }
            Ok(())
        },
        Phase::UpdateInMemory => check(ctx, meta, req).await,
        Phase::Persist => Ok(()),
        Phase::Commit => Ok(()),
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

async fn check(ctx: &JobContext, meta: &JobMeta, req: &ValidateDatabase)
    -> Result<()>
{
    if ctx.config.validate_database().await? {
        return Ok(());
    }
    tracing::warn!(job = %meta.job, caller = ?req.caller,
        "configuration database failed validation");
    match req.failure_action {
        FailureAction::Trace => (),
        FailureAction::EnterDegradedMode => {
            ctx.config.enter_degraded_mode().await?;
        },
        FailureAction::FaultController => {
            ctx.config.enter_degraded_mode().await?;
            ctx.config.fault_controller().await?;
        },
    }
    // The job itself must fail so the corruption reaches the notification
    // bus, whatever the action taken.
    Err(Error::ConfigUpdateFailed)
}

// LCOV_EXCL_STOP
