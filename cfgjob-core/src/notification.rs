// vim: tw=80
//! Terminal job notifications
//!
//! Every accepted job ends with exactly one notification on the bus, whether
//! it committed or rolled back.  Observers that lag far enough to miss events
//! see a `Lagged` error from the broadcast channel rather than silence.

use crate::{job::JobType, types::*};
use num_traits::ToPrimitive;
use serde_derive::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// How a job ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum JobStatus {
    /// All phases ran; the configuration change is durable.
    Committed,
    /// A phase failed; any open transaction was aborted.
    RolledBack,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JobNotification {
    pub job: JobNumber,
    pub job_type: JobType,
    /// The principal object the job touched, if any
    pub object: ObjectId,
    pub status: JobStatus,
    /// Wire code of the error, or 0 on success
    pub error_code: u32,
}

impl JobNotification {
    pub fn committed(job: JobNumber, job_type: JobType, object: ObjectId)
        -> Self
    {
        JobNotification{job, job_type, object, status: JobStatus::Committed,
                        error_code: 0}
    }

    pub fn rolled_back(job: JobNumber, job_type: JobType, object: ObjectId,
                       error: Error) -> Self
    {
        JobNotification{job, job_type, object, status: JobStatus::RolledBack,
                        error_code: error.to_u32().unwrap_or(0)}
    }
}

#[derive(Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<JobNotification>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        NotificationBus{tx}
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobNotification> {
        self.tx.subscribe()
    }

    /// Publish a terminal notification.  Having no subscribers is not an
    /// error; jobs complete whether or not anybody is watching.
    pub fn publish(&self, n: JobNotification) {
        let _ = self.tx.send(n);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        NotificationBus::new(64)
    }
}

/// Wait for the terminal notification of one specific job.
pub async fn wait_for(rx: &mut broadcast::Receiver<JobNotification>,
                      job: JobNumber) -> Result<JobNotification>
{
    loop {
        match rx.recv().await {
            Ok(n) if n.job == job => break Ok(n),
            Ok(_) => continue,
            Err(_) => break Err(Error::Internal),
        }
    }
}

// LCOV_EXCL_STOP
