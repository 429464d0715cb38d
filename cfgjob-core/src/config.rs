// vim: tw=80
//! Client for the configuration service
//!
//! All structural changes to the object graph go through here, either inside
//! a transaction (mutations) or outside one (lookups and maintenance calls).
//! The service itself runs elsewhere; this module only owns the request
//! channel and the typed protocol.

use crate::types::*;
use futures::channel::{mpsc, oneshot};
#[cfg(test)] use mockall::automock;
use serde_derive::{Deserialize, Serialize};

/// A single structural change, applied inside a transaction.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Mutation {
    CreateProvisionDrive {
        location: DriveLocation,
        serial: SerialNumber,
        config_type: PvdConfigType,
        capacity: u64,
        block_size: u32,
    },
    DestroyProvisionDrive(ObjectId),
    CreateExtentPool {
        pool: PoolId,
        drives: Vec<ObjectId>,
    },
    DestroyExtentPool(ObjectId),
    CreateLun {
        lun: LunNumber,
        raid_group: ObjectId,
        capacity: u64,
    },
    DestroyLun(ObjectId),
    UpdateLun {
        object: ObjectId,
        wwn: Option<Wwn>,
        attributes: Option<u32>,
    },
    UpdatePvdConfigType {
        object: ObjectId,
        config_type: PvdConfigType,
    },
    UpdatePvdSniffVerify {
        object: ObjectId,
        enabled: bool,
    },
    UpdatePvdPoolId {
        object: ObjectId,
        pool: PoolId,
    },
    UpdatePvdSerialNumber {
        object: ObjectId,
        serial: SerialNumber,
    },
    SetSystemEncryptionMode(SystemEncryptionMode),
    SetEncryptionPaused(bool),
    SetBgServiceFlags {
        flags: BgServiceFlags,
        enable: bool,
    },
}

/// What the service knows about one provision drive.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PvdInfo {
    pub object: ObjectId,
    pub config_type: PvdConfigType,
    pub end_of_life: bool,
    pub pool: PoolId,
}

/// What the service knows about one LUN.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct LunInfo {
    pub object: ObjectId,
    pub raid_group: ObjectId,
    pub wwn: Wwn,
}

/// What the service knows about one extent pool.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PoolInfo {
    pub object: ObjectId,
    pub metadata_lun: ObjectId,
}

/// Outcome of a RAID group capacity expansion attempt.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ExpandStatus {
    Completed,
    /// The object is quiescing or reconfiguring; try again later.
    Busy,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Request {
    StartTransaction(JobNumber),
    CommitTransaction(TransactionId),
    AbortTransaction(TransactionId),
    Apply(TransactionId, Mutation),
    LookupLun(LunNumber),
    LookupLunByWwn(Wwn),
    LookupPool(PoolId),
    PoolMemberDrives(ObjectId),
    UpstreamEdgeCount(ObjectId),
    RaidGroupIsBroken(ObjectId),
    SystemMirrorDoubleDegraded,
    PvdInfo(ObjectId),
    DriveBySerial(SerialNumber),
    ConnectDrives(Vec<ObjectId>),
    ValidationAllowed(ValidateCaller),
    ValidateDatabase,
    EnterDegradedMode,
    FaultController,
    CommitObjectTables,
    ExpandRaidGroup(ObjectId, u64),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Response {
    StartTransaction(Result<TransactionId>),
    CommitTransaction(Result<()>),
    AbortTransaction(Result<()>),
    Apply(Result<ObjectId>),
    LookupLun(Result<LunInfo>),
    LookupLunByWwn(Result<LunInfo>),
    LookupPool(Result<PoolInfo>),
    PoolMemberDrives(Result<Vec<ObjectId>>),
    UpstreamEdgeCount(Result<u32>),
    RaidGroupIsBroken(Result<bool>),
    SystemMirrorDoubleDegraded(Result<bool>),
    PvdInfo(Result<PvdInfo>),
    DriveBySerial(Result<Option<ObjectId>>),
    ConnectDrives(Result<()>),
    ValidationAllowed(Result<bool>),
    ValidateDatabase(Result<bool>),
    EnterDegradedMode(Result<()>),
    FaultController(Result<()>),
    CommitObjectTables(Result<()>),
    ExpandRaidGroup(Result<ExpandStatus>),
}

macro_rules! into_response {
    ($fn_name:ident, $variant:ident, $t:ty) => {
        pub fn $fn_name(self) -> Result<$t> {
            match self {
                Response::$variant(r) => r,
                x => panic!("Unexpected response type {x:?}")
            }
        }
    }
}

impl Response {
    into_response!(into_start_transaction, StartTransaction, TransactionId);
    into_response!(into_commit_transaction, CommitTransaction, ());
    into_response!(into_abort_transaction, AbortTransaction, ());
    into_response!(into_apply, Apply, ObjectId);
    into_response!(into_lookup_lun, LookupLun, LunInfo);
    into_response!(into_lookup_lun_by_wwn, LookupLunByWwn, LunInfo);
    into_response!(into_lookup_pool, LookupPool, PoolInfo);
    into_response!(into_pool_member_drives, PoolMemberDrives, Vec<ObjectId>);
    into_response!(into_upstream_edge_count, UpstreamEdgeCount, u32);
    into_response!(into_raid_group_is_broken, RaidGroupIsBroken, bool);
    into_response!(into_system_mirror_double_degraded,
                   SystemMirrorDoubleDegraded, bool);
    into_response!(into_pvd_info, PvdInfo, PvdInfo);
    into_response!(into_drive_by_serial, DriveBySerial, Option<ObjectId>);
    into_response!(into_connect_drives, ConnectDrives, ());
    into_response!(into_validation_allowed, ValidationAllowed, bool);
    into_response!(into_validate_database, ValidateDatabase, bool);
    into_response!(into_enter_degraded_mode, EnterDegradedMode, ());
    into_response!(into_fault_controller, FaultController, ());
    into_response!(into_commit_object_tables, CommitObjectTables, ());
    into_response!(into_expand_raid_group, ExpandRaidGroup, ExpandStatus);
}

pub type ConfigEnvelope = (Request, oneshot::Sender<Response>);

/// Handle to the configuration service's request channel.
#[derive(Clone)]
pub struct ConfigClient {
    tx: mpsc::UnboundedSender<ConfigEnvelope>,
}

#[cfg_attr(test, automock)]
impl ConfigClient {
    pub fn new(tx: mpsc::UnboundedSender<ConfigEnvelope>) -> Self {
        ConfigClient{tx}
    }

    /// Send one request and wait for its reply.  A hung-up service is an
    /// internal error; the job engine cannot work without one.
    async fn call(&self, req: Request) -> Result<Response> {
        let (tx, rx) = oneshot::channel();
        self.tx.unbounded_send((req, tx))
            .map_err(|_| Error::Internal)?;
        rx.await.map_err(|_| Error::Internal)
    }

    pub async fn start_transaction(&self, job: JobNumber)
        -> Result<TransactionId>
    {
        self.call(Request::StartTransaction(job)).await?
            .into_start_transaction()
    }

    pub async fn commit_transaction(&self, tx: TransactionId) -> Result<()> {
        self.call(Request::CommitTransaction(tx)).await?
            .into_commit_transaction()
    }

    pub async fn abort_transaction(&self, tx: TransactionId) -> Result<()> {
        self.call(Request::AbortTransaction(tx)).await?
            .into_abort_transaction()
    }

    /// Apply one mutation inside an open transaction.  Returns the id of the
    /// object the mutation created or modified.
    pub async fn apply(&self, tx: TransactionId, m: Mutation)
        -> Result<ObjectId>
    {
        self.call(Request::Apply(tx, m)).await?.into_apply()
    }

    pub async fn lookup_lun(&self, lun: LunNumber) -> Result<LunInfo> {
        self.call(Request::LookupLun(lun)).await?.into_lookup_lun()
    }

    pub async fn lookup_lun_by_wwn(&self, wwn: Wwn) -> Result<LunInfo> {
        self.call(Request::LookupLunByWwn(wwn)).await?
            .into_lookup_lun_by_wwn()
    }

    pub async fn lookup_pool(&self, pool: PoolId) -> Result<PoolInfo> {
        self.call(Request::LookupPool(pool)).await?.into_lookup_pool()
    }

    pub async fn pool_member_drives(&self, pool: ObjectId)
        -> Result<Vec<ObjectId>>
    {
        self.call(Request::PoolMemberDrives(pool)).await?
            .into_pool_member_drives()
    }

    pub async fn upstream_edge_count(&self, object: ObjectId) -> Result<u32> {
        self.call(Request::UpstreamEdgeCount(object)).await?
            .into_upstream_edge_count()
    }

    pub async fn raid_group_is_broken(&self, object: ObjectId) -> Result<bool>
    {
        self.call(Request::RaidGroupIsBroken(object)).await?
            .into_raid_group_is_broken()
    }

    /// Is the mirror holding the system database missing two of its three
    /// drives?
    pub async fn system_mirror_double_degraded(&self) -> Result<bool> {
        self.call(Request::SystemMirrorDoubleDegraded).await?
            .into_system_mirror_double_degraded()
    }

    pub async fn pvd_info(&self, object: ObjectId) -> Result<PvdInfo> {
        self.call(Request::PvdInfo(object)).await?.into_pvd_info()
    }

    pub async fn drive_by_serial(&self, serial: SerialNumber)
        -> Result<Option<ObjectId>>
    {
        self.call(Request::DriveBySerial(serial)).await?
            .into_drive_by_serial()
    }

    /// Reattach discovered physical drives to their provision drive objects.
    /// Deliberately transactionless; connection state is not configuration.
    pub async fn connect_drives(&self, drives: Vec<ObjectId>) -> Result<()> {
        self.call(Request::ConnectDrives(drives)).await?
            .into_connect_drives()
    }

    pub async fn validation_allowed(&self, caller: ValidateCaller)
        -> Result<bool>
    {
        self.call(Request::ValidationAllowed(caller)).await?
            .into_validation_allowed()
    }

    /// Run a full consistency check of the configuration database.  Returns
    /// `true` if the database is consistent.
    pub async fn validate_database(&self) -> Result<bool> {
        self.call(Request::ValidateDatabase).await?.into_validate_database()
    }

    pub async fn enter_degraded_mode(&self) -> Result<()> {
        self.call(Request::EnterDegradedMode).await?
            .into_enter_degraded_mode()
    }

    pub async fn fault_controller(&self) -> Result<()> {
        self.call(Request::FaultController).await?.into_fault_controller()
    }

    /// Commit the new object-table schema after a software upgrade.
    pub async fn commit_object_tables(&self) -> Result<()> {
        self.call(Request::CommitObjectTables).await?
            .into_commit_object_tables()
    }

    pub async fn expand_raid_group(&self, object: ObjectId, capacity: u64)
        -> Result<ExpandStatus>
    {
        self.call(Request::ExpandRaidGroup(object, capacity)).await?
            .into_expand_raid_group()
    }
}

// LCOV_EXCL_STOP
