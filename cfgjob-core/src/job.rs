// vim: tw=80
//! Job records and their payloads
//!
//! A job record carries one configuration change through the engine's phase
//! sequence.  The record owns all of its mutable bookkeeping, including any
//! open transaction; nothing about a job lives in globals.

use crate::types::*;
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// The phase a record is in, or last completed.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    Validate,
    /// Reserved for operations that pick resources after validation.  No
    /// current operation defines it and the engine never schedules it.
    Select,
    UpdateInMemory,
    Persist,
    Commit,
    Rollback,
}

/// One operation family per variant.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum JobType {
    CreateProvisionDrive,
    DestroyProvisionDrive,
    UpdateProvisionDrive,
    CreateExtentPool,
    DestroyExtentPool,
    DestroyLun,
    UpdateLun,
    ConnectDrive,
    ValidateDatabase,
    UpdateEncryption,
    ControlBgService,
    NduCommit,
}

/// One candidate drive in a batch create request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DriveCandidate {
    pub location: DriveLocation,
    pub serial: SerialNumber,
    pub config_type: PvdConfigType,
    pub capacity: u64,
    pub block_size: u32,
    /// Cleared during validation if the drive is already in the database
    pub valid: bool,
    /// Filled in as the drive object is created
    pub object: Option<ObjectId>,
}

impl DriveCandidate {
    pub fn new(location: DriveLocation, serial: SerialNumber,
               config_type: PvdConfigType, capacity: u64, block_size: u32)
        -> Self
    {
        DriveCandidate{location, serial, config_type, capacity, block_size,
                       valid: true, object: None}
    }
}

/// Which provision drive attribute an update job changes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum PvdUpdate {
    ConfigType(PvdConfigType),
    SniffVerify(bool),
    PoolId(PoolId),
    SerialNumber(SerialNumber),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CreateProvisionDrive {
    pub drives: Vec<DriveCandidate>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DestroyProvisionDrive {
    pub object: ObjectId,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UpdateProvisionDrive {
    pub object: ObjectId,
    pub update: PvdUpdate,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CreateExtentPool {
    pub pool: PoolId,
    pub drives: Vec<ObjectId>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DestroyExtentPool {
    pub pool: PoolId,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DestroyLun {
    pub lun: LunNumber,
    /// Permit destruction even though the system database mirror is double
    /// degraded, provided the LUN's RAID group is already broken.
    pub allow_destroy_broken: bool,
    /// Wait in the commit phase until the object is gone
    pub wait_destroy: bool,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UpdateLun {
    pub lun: LunNumber,
    pub wwn: Option<Wwn>,
    pub attributes: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConnectDrive {
    pub drives: Vec<ObjectId>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ValidateDatabase {
    pub caller: ValidateCaller,
    pub failure_action: FailureAction,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum UpdateEncryption {
    SetMode(SystemEncryptionMode),
    SetPaused(bool),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ControlBgService {
    pub flags: BgServiceFlags,
    pub enable: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NduCommit {}

/// The request half of a job record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum JobPayload {
    CreateProvisionDrive(CreateProvisionDrive),
    DestroyProvisionDrive(DestroyProvisionDrive),
    UpdateProvisionDrive(UpdateProvisionDrive),
    CreateExtentPool(CreateExtentPool),
    DestroyExtentPool(DestroyExtentPool),
    DestroyLun(DestroyLun),
    UpdateLun(UpdateLun),
    ConnectDrive(ConnectDrive),
    ValidateDatabase(ValidateDatabase),
    UpdateEncryption(UpdateEncryption),
    ControlBgService(ControlBgService),
    NduCommit(NduCommit),
}

impl JobPayload {
    pub fn job_type(&self) -> JobType {
        match self {
            JobPayload::CreateProvisionDrive(_) =>
                JobType::CreateProvisionDrive,
            JobPayload::DestroyProvisionDrive(_) =>
                JobType::DestroyProvisionDrive,
            JobPayload::UpdateProvisionDrive(_) =>
                JobType::UpdateProvisionDrive,
            JobPayload::CreateExtentPool(_) => JobType::CreateExtentPool,
            JobPayload::DestroyExtentPool(_) => JobType::DestroyExtentPool,
            JobPayload::DestroyLun(_) => JobType::DestroyLun,
            JobPayload::UpdateLun(_) => JobType::UpdateLun,
            JobPayload::ConnectDrive(_) => JobType::ConnectDrive,
            JobPayload::ValidateDatabase(_) => JobType::ValidateDatabase,
            JobPayload::UpdateEncryption(_) => JobType::UpdateEncryption,
            JobPayload::ControlBgService(_) => JobType::ControlBgService,
            JobPayload::NduCommit(_) => JobType::NduCommit,
        }
    }
}

/// A commit-phase barrier: wait for `object` (default: the record's
/// principal object) to reach `state`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitForState {
    pub state: LifecycleState,
    pub timeout: Duration,
}

/// Per-job bookkeeping, separate from the payload so phase handlers can
/// borrow both halves at once.
#[derive(Debug)]
pub struct JobMeta {
    pub job: JobNumber,
    pub job_type: JobType,
    /// The phase currently executing
    pub phase: Option<Phase>,
    /// The phase that ran before the current one.  Rollback consults it to
    /// decide whether a transaction abort is due.
    pub previous_phase: Option<Phase>,
    /// The open configuration transaction, if any.  Holding it here rather
    /// than in the configuration client keeps abort-on-rollback a local
    /// decision.
    pub transaction: Option<TransactionId>,
    /// Principal object of the job, once known
    pub object: ObjectId,
    /// First error any phase reported
    pub error: Option<Error>,
    /// Commit-phase lifecycle barrier, set by update_in_memory or commit
    pub wait: Option<WaitForState>,
}

impl JobMeta {
    pub fn new(job: JobNumber, job_type: JobType) -> Self {
        JobMeta {
            job,
            job_type,
            phase: None,
            previous_phase: None,
            transaction: None,
            object: ObjectId::INVALID,
            error: None,
            wait: None,
        }
    }

    /// Record entry into the next phase.
    pub fn enter(&mut self, phase: Phase) {
        self.previous_phase = self.phase;
        self.phase = Some(phase);
    }
}

#[derive(Debug)]
pub struct JobRecord {
    pub meta: JobMeta,
    pub payload: JobPayload,
}

impl JobRecord {
    pub fn new(job: JobNumber, payload: JobPayload) -> Self {
        let meta = JobMeta::new(job, payload.job_type());
        JobRecord{meta, payload}
    }
}

// LCOV_EXCL_STOP
