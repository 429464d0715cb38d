// vim: tw=80
//! The array's private space layout
//!
//! A static description of the regions and LUNs the software reserves on the
//! first few drives for its own metadata.  Upgrade commit consults it to
//! grow private regions and to create private LUNs a newer release defines.

use crate::types::*;

/// One reserved RAID group on the system drives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PrivateRegion {
    pub raid_group: ObjectId,
    /// Capacity the current release expects, in blocks
    pub capacity: u64,
}

/// One reserved LUN carved from a private region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PrivateLun {
    pub lun: LunNumber,
    pub raid_group: ObjectId,
    pub capacity: u64,
}

/// Object ids below this bound are reserved for the private space layout.
pub const FIRST_USER_OBJECT: ObjectId = ObjectId(0x100);

const SYSTEM_DRIVES: [DriveLocation; 4] = [
    DriveLocation{bus: 0, enclosure: 0, slot: 0},
    DriveLocation{bus: 0, enclosure: 0, slot: 1},
    DriveLocation{bus: 0, enclosure: 0, slot: 2},
    DriveLocation{bus: 0, enclosure: 0, slot: 3},
];

const PRIVATE_REGIONS: [PrivateRegion; 3] = [
    // Triple mirror holding the configuration database
    PrivateRegion{raid_group: ObjectId(0x10), capacity: 0x0040_0000},
    // Vault for cached writes on power loss
    PrivateRegion{raid_group: ObjectId(0x11), capacity: 0x0100_0000},
    // Metadata mirror for the other internal services
    PrivateRegion{raid_group: ObjectId(0x12), capacity: 0x0080_0000},
];

const PRIVATE_LUNS: [PrivateLun; 4] = [
    PrivateLun{lun: LunNumber(0xFF00), raid_group: ObjectId(0x10),
               capacity: 0x0020_0000},
    PrivateLun{lun: LunNumber(0xFF01), raid_group: ObjectId(0x11),
               capacity: 0x00C0_0000},
    PrivateLun{lun: LunNumber(0xFF02), raid_group: ObjectId(0x12),
               capacity: 0x0020_0000},
    PrivateLun{lun: LunNumber(0xFF03), raid_group: ObjectId(0x12),
               capacity: 0x0010_0000},
];

/// Does this slot hold one of the drives the private regions live on?
pub fn is_system_drive(location: &DriveLocation) -> bool {
    SYSTEM_DRIVES.contains(location)
}

pub fn private_regions() -> &'static [PrivateRegion] {
    &PRIVATE_REGIONS
}

pub fn private_luns() -> &'static [PrivateLun] {
    &PRIVATE_LUNS
}

// LCOV_EXCL_STOP
