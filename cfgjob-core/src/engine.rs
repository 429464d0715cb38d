// vim: tw=80
//! The job engine
//!
//! One worker task drains a FIFO of job records and runs each one through
//! the forward phases, falling back to rollback on the first failure.  A
//! record is in flight from submission until its terminal notification; the
//! worker never interleaves two records.

use crate::{
    job::{JobPayload, JobRecord, Phase},
    notification::{JobNotification, NotificationBus},
    ops::{self, JobContext},
    types::*,
};
use futures::{StreamExt, channel::mpsc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{sync::broadcast, task::JoinHandle};

/// How one record left the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TerminalOutcome {
    /// All forward phases ran; the change is durable.
    Committed,
    /// A phase failed and rollback ran.
    RolledBack(Error),
}

#[derive(Debug)]
enum WorkerMsg {
    Submit(Box<JobRecord>),
    Shutdown,
}

pub struct JobService {
    tx: mpsc::UnboundedSender<WorkerMsg>,
    jh: JoinHandle<()>,
    next_job: AtomicU64,
    bus: NotificationBus,
}

impl JobService {
    const FORWARD_PHASES: [Phase; 4] = [
        Phase::Validate,
        Phase::UpdateInMemory,
        Phase::Persist,
        Phase::Commit,
    ];

    pub fn new(ctx: JobContext, bus: NotificationBus) -> Self {
        let (tx, rx) = mpsc::unbounded();
        let jh = JobService::run(ctx, bus.clone(), rx);
        JobService{tx, jh, next_job: AtomicU64::new(1), bus}
    }

    pub fn notifications(&self) -> broadcast::Receiver<JobNotification> {
        self.bus.subscribe()
    }

    /// Accept a request.  The returned number identifies the job's terminal
    /// notification; the work itself happens on the worker task.
    pub fn submit(&self, payload: JobPayload) -> Result<JobNumber> {
        let job = JobNumber(self.next_job.fetch_add(1, Ordering::Relaxed));
        let record = Box::new(JobRecord::new(job, payload));
        self.tx.unbounded_send(WorkerMsg::Submit(record))
            .map_err(|_| Error::Internal)?;
        Ok(job)
    }

    fn run(ctx: JobContext, bus: NotificationBus,
        mut rx: mpsc::UnboundedReceiver<WorkerMsg>) -> JoinHandle<()>
    {
        let taskfut = async move {
            while let Some(msg) = rx.next().await {
                match msg {
                    WorkerMsg::Submit(mut record) => {
                        let outcome =
                            JobService::execute(&ctx, &mut record).await;
                        let meta = &record.meta;
                        let n = match outcome {
                            TerminalOutcome::Committed =>
                                JobNotification::committed(meta.job,
                                    meta.job_type, meta.object),
                            TerminalOutcome::RolledBack(e) =>
                                JobNotification::rolled_back(meta.job,
                                    meta.job_type, meta.object, e),
                        };
                        bus.publish(n);
                    },
                    WorkerMsg::Shutdown => break,
                }
            }
        };
        tokio::spawn(taskfut)
    }

    /// Run one record end-to-end.  Rollback runs at most once, and always
    /// with `previous_phase` naming the phase that failed.
    #[tracing::instrument(skip_all,
        fields(job = %record.meta.job, job_type = ?record.meta.job_type))]
    async fn execute(ctx: &JobContext, record: &mut JobRecord)
        -> TerminalOutcome
    {
        for phase in JobService::FORWARD_PHASES {
            record.meta.enter(phase);
            let r = ops::dispatch(ctx, phase, &mut record.meta,
                                  &mut record.payload).await;
            if let Err(e) = r {
                tracing::warn!(job = %record.meta.job, ?phase, error = %e,
                    "job phase failed");
                record.meta.error = Some(e);
                record.meta.enter(Phase::Rollback);
                if let Err(re) = ops::dispatch(ctx, Phase::Rollback,
                    &mut record.meta, &mut record.payload).await
                {
                    tracing::warn!(job = %record.meta.job, error = %re,
                        "rollback failed; a transaction may be left open");
                }
                return TerminalOutcome::RolledBack(e);
            }
        }
        TerminalOutcome::Committed
    }

    /// Stop accepting work and wait for the worker to drain.  The queue is
    /// FIFO, so every record submitted before this call still runs to its
    /// terminal notification; the worker exits when it reaches the shutdown
    /// message.
    pub async fn shutdown(self) {
        self.tx.unbounded_send(WorkerMsg::Shutdown).unwrap();
        self.jh.await.unwrap();
    }
}

// LCOV_EXCL_STOP
