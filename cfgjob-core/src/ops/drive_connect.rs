// vim: tw=80
//! Reconnecting discovered drives to their provision drive objects
//!
//! Connection state is rediscovered on every boot, so this family runs
//! without a transaction; there is nothing durable to undo.

use crate::{
    job::{ConnectDrive, JobMeta, Phase},
    types::*,
};
use super::{JobContext, common};

pub(super) async fn run(ctx: &JobContext, phase: Phase, meta: &mut JobMeta,
    req: &mut ConnectDrive) -> Result<()>
{
    match phase {
        Phase::Validate => {
            if req.drives.is_empty() {
                Err(Error::InvalidValue)
            } else {
                Ok(())
            }
        },
        Phase::UpdateInMemory =>
            ctx.config.connect_drives(req.drives.clone()).await,
        Phase::Persist => Ok(()),
        Phase::Commit => Ok(()),
        Phase::Rollback => common::abort_if_open(ctx, meta).await,
        Phase::Select => Ok(()),
    }
}

// LCOV_EXCL_STOP
