// vim: tw=80

use cfgjob_core::{
    job::{DestroyLun, JobPayload, UpdateLun},
    types::*,
};

use super::*;

fn destroy(lun: LunNumber, allow_destroy_broken: bool) -> JobPayload {
    JobPayload::DestroyLun(DestroyLun {
        lun,
        allow_destroy_broken,
        wait_destroy: false,
        timeout: None,
    })
}

#[tokio::test]
async fn destroy_unknown_lun() {
    let mut h = harness();
    let n = h.run(destroy(LunNumber(3), false)).await;
    assert_rolled_back(&n, Error::UnknownId);
    {
        let db = h.db();
        assert!(db.committed.is_empty());
        assert!(db.aborted.is_empty());
    }
    h.shutdown().await;
}

#[tokio::test]
async fn destroy_lun() {
    let mut db = FakeDb::new();
    let oid = db.add_lun(LunNumber(3), ObjectId(0x20));
    let mut h = harness_with(db);
    let n = h.run(destroy(LunNumber(3), false)).await;
    assert_committed(&n);
    {
        let db = h.db();
        assert!(!db.luns.contains_key(&oid));
        assert_eq!(db.committed.len(), 1);
        assert!(db.aborted.is_empty());
    }
    h.shutdown().await;
}

#[tokio::test]
async fn destroy_lun_and_wait() {
    let mut db = FakeDb::new();
    db.add_lun(LunNumber(3), ObjectId(0x20));
    let mut h = harness_with(db);
    let n = h.run(JobPayload::DestroyLun(DestroyLun {
        lun: LunNumber(3),
        allow_destroy_broken: false,
        wait_destroy: true,
        timeout: Some(std::time::Duration::from_secs(5)),
    })).await;
    assert_committed(&n);
    h.shutdown().await;
}

#[tokio::test]
async fn double_degraded_mirror_refuses_destruction() {
    let mut db = FakeDb::new();
    db.add_lun(LunNumber(3), ObjectId(0x20));
    db.double_degraded = true;
    let mut h = harness_with(db);
    let n = h.run(destroy(LunNumber(3), false)).await;
    assert_rolled_back(&n, Error::DbDriveDoubleDegraded);
    h.shutdown().await;
}

/// The override only helps when the LUN's RAID group is already broken.
#[tokio::test]
async fn double_degraded_override_intact_group() {
    let mut db = FakeDb::new();
    db.add_lun(LunNumber(3), ObjectId(0x20));
    db.double_degraded = true;
    let mut h = harness_with(db);
    let n = h.run(destroy(LunNumber(3), true)).await;
    assert_rolled_back(&n, Error::DbDriveDoubleDegraded);
    h.shutdown().await;
}

#[tokio::test]
async fn double_degraded_override_broken_group() {
    let mut db = FakeDb::new();
    db.add_lun(LunNumber(3), ObjectId(0x20));
    db.double_degraded = true;
    db.broken_raid_groups.push(ObjectId(0x20));
    let mut h = harness_with(db);
    let n = h.run(destroy(LunNumber(3), true)).await;
    assert_committed(&n);
    assert!(h.db().luns.is_empty());
    h.shutdown().await;
}

#[tokio::test]
async fn update_lun_wwn() {
    let mut db = FakeDb::new();
    let oid = db.add_lun(LunNumber(3), ObjectId(0x20));
    let mut h = harness_with(db);
    let wwn = Wwn([0xAB; 16]);
    let n = h.run(JobPayload::UpdateLun(UpdateLun {
        lun: LunNumber(3),
        wwn: Some(wwn),
        attributes: Some(7),
    })).await;
    assert_committed(&n);
    {
        let db = h.db();
        assert_eq!(db.luns[&oid].wwn, wwn);
        assert_eq!(db.luns[&oid].attributes, 7);
    }
    h.shutdown().await;
}

#[tokio::test]
async fn update_lun_wwn_collision() {
    let mut db = FakeDb::new();
    db.add_lun(LunNumber(3), ObjectId(0x20));
    db.add_lun(LunNumber(4), ObjectId(0x20));
    let mut h = harness_with(db);
    // Every fake LUN's WWN is derived from its number
    let n = h.run(JobPayload::UpdateLun(UpdateLun {
        lun: LunNumber(3),
        wwn: Some(Wwn([4; 16])),
        attributes: None,
    })).await;
    assert_rolled_back(&n, Error::InvalidValue);
    h.shutdown().await;
}

/// Re-assigning a LUN its own WWN is fine.
#[tokio::test]
async fn update_lun_wwn_self() {
    let mut db = FakeDb::new();
    db.add_lun(LunNumber(3), ObjectId(0x20));
    let mut h = harness_with(db);
    let n = h.run(JobPayload::UpdateLun(UpdateLun {
        lun: LunNumber(3),
        wwn: Some(Wwn([3; 16])),
        attributes: None,
    })).await;
    assert_committed(&n);
    h.shutdown().await;
}
