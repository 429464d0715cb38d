// vim: tw=80
//! Common type definitions used throughout the configuration job service

use enum_primitive_derive::Primitive;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use std::{
    fmt::{self, Display, Formatter},
    time::Duration,
};

/// Identifies an object in the storage topology.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq,
         PartialOrd, Serialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub const INVALID: ObjectId = ObjectId(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Monotonic sequence number assigned to each accepted job.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq,
         PartialOrd, Serialize)]
pub struct JobNumber(pub u64);

impl Display for JobNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle for an open configuration transaction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TransactionId(pub u64);

/// User-visible storage pool number.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PoolId(pub u32);

impl PoolId {
    pub const INVALID: PoolId = PoolId(u32::MAX);
}

impl Display for PoolId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User-visible LUN number.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LunNumber(pub u32);

impl Display for LunNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// World Wide Name of a LUN.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq,
         Serialize)]
pub struct Wwn(pub [u8; 16]);

/// Physical position of a drive in the array.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DriveLocation {
    pub bus: u32,
    pub enclosure: u32,
    pub slot: u32,
}

impl Display for DriveLocation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}_{}_{}", self.bus, self.enclosure, self.slot)
    }
}

/// A drive's serial number, as read from its inquiry page.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SerialNumber(pub String);

impl Display for SerialNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SerialNumber {
    fn from(s: &str) -> Self {
        SerialNumber(s.to_owned())
    }
}

/// How a provision drive may be consumed.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PvdConfigType {
    /// Not bound into any RAID group or pool
    Unconsumed,
    /// A member of a traditional RAID group
    Raid,
    /// A hot spare
    Spare,
    /// A member of an extent pool
    ExtPool,
    Invalid,
}

/// The subset of object lifecycle states this crate consumes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum LifecycleState {
    Specialize,
    Activate,
    Ready,
    Hibernate,
    Offline,
    Fail,
    Destroy,
    NotExist,
}

/// Array-wide encryption mode.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Primitive, Serialize)]
pub enum SystemEncryptionMode {
    Invalid     = 0,
    Unencrypted = 1,
    Encrypted   = 2,
}

/// Which background services a control-service job may enable or disable.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BgServiceFlags(pub u64);

impl BgServiceFlags {
    pub const SNIFF_VERIFY: BgServiceFlags   = BgServiceFlags(1 << 0);
    pub const ZEROING: BgServiceFlags        = BgServiceFlags(1 << 1);
    pub const REBUILD: BgServiceFlags        = BgServiceFlags(1 << 2);
    pub const VERIFY: BgServiceFlags         = BgServiceFlags(1 << 3);
    pub const ALL: BgServiceFlags            = BgServiceFlags(0xF);

    pub fn is_valid(&self) -> bool {
        self.0 != 0 && (self.0 & !Self::ALL.0) == 0
    }
}

/// Who requested a database validation pass.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValidateCaller {
    User,
    PeerBoot,
    NduCommit,
}

/// What to do when database validation finds an inconsistency.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FailureAction {
    /// Log and carry on
    Trace,
    /// Stop accepting configuration changes
    EnterDegradedMode,
    /// Degraded mode, then take the controller down
    FaultController,
}

/// The job service's error type.  Discriminants are the wire codes reported
/// in terminal notifications.
#[derive(Clone, Copy, Debug, Deserialize, Error, Eq, PartialEq, Primitive,
         Serialize)]
pub enum Error {
    #[error("Internal error")]
    Internal                 = 1,
    #[error("Invalid object id")]
    InvalidId                = 2,
    #[error("No object with the requested id")]
    UnknownId                = 3,
    #[error("Object still has upstream consumers")]
    HasUpstreamEdges         = 4,
    #[error("Configuration service rejected the update")]
    ConfigUpdateFailed       = 5,
    #[error("Timed out waiting for the object to settle")]
    Timeout                  = 6,
    #[error("System database mirror is double degraded")]
    DbDriveDoubleDegraded    = 7,
    #[error("Invalid value")]
    InvalidValue             = 8,
    #[error("Invalid update type")]
    InvalidUpdateType        = 9,
    #[error("Drive is already unconsumed")]
    PvdConfiguredAsUnconsumed = 10,
    #[error("Drive is already a RAID member")]
    PvdConfiguredAsRaid      = 11,
    #[error("Drive is already a spare")]
    PvdConfiguredAsSpare     = 12,
    #[error("Drive is consumed by a RAID group")]
    PvdInUseForRaidGroup     = 13,
    #[error("Drive is in its end-of-life state")]
    PvdEndOfLife             = 14,
    #[error("Serial number already present in the database")]
    SerialNumberInUse        = 15,
}

pub type Result<T> = ::std::result::Result<T, Error>;

/// Default bound on commit-time lifecycle waits.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(30_000);

// LCOV_EXCL_STOP
