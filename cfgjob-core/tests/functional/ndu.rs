// vim: tw=80

use cfgjob_core::{
    job::{JobPayload, NduCommit},
    layout,
    types::*,
};

use super::*;

fn seed_private_space(db: &mut FakeDb) {
    for pl in layout::private_luns() {
        db.add_lun(pl.lun, pl.raid_group);
    }
}

#[tokio::test]
async fn commit_expands_every_private_region() {
    let mut db = FakeDb::new();
    seed_private_space(&mut db);
    let mut h = harness_with(db);
    let n = h.run(JobPayload::NduCommit(NduCommit{})).await;
    assert_committed(&n);
    {
        let db = h.db();
        assert!(db.object_tables_committed);
        for region in layout::private_regions() {
            assert_eq!(db.expanded[&region.raid_group], region.capacity);
        }
        // Nothing was missing, so no transaction was needed
        assert!(db.committed.is_empty());
    }
    h.shutdown().await;
}

/// A region busy for a few polls is retried until it completes.
#[tokio::test]
async fn commit_retries_busy_regions() {
    let mut db = FakeDb::new();
    seed_private_space(&mut db);
    let region = layout::private_regions()[1];
    db.expand_busy.insert(region.raid_group, 3);
    let mut h = harness_with(db);
    let n = h.run(JobPayload::NduCommit(NduCommit{})).await;
    assert_committed(&n);
    assert_eq!(h.db().expanded[&region.raid_group], region.capacity);
    h.shutdown().await;
}

/// A region that stays busy past the budget fails the job with a timeout.
/// Nothing is rolled back; the schema commit already happened.
#[tokio::test(start_paused = true)]
async fn commit_gives_up_on_stuck_region() {
    let mut db = FakeDb::new();
    seed_private_space(&mut db);
    let region = layout::private_regions()[0];
    db.expand_busy.insert(region.raid_group, u32::MAX);
    let mut h = harness_with(db);
    let n = h.run(JobPayload::NduCommit(NduCommit{})).await;
    assert_rolled_back(&n, Error::Timeout);
    {
        let db = h.db();
        assert!(db.object_tables_committed);
        assert!(db.aborted.is_empty());
    }
    h.shutdown().await;
}

#[tokio::test]
async fn commit_creates_missing_private_luns() {
    let mut db = FakeDb::new();
    // Seed all but the last private LUN, as an older release would have
    for pl in &layout::private_luns()[..layout::private_luns().len() - 1] {
        db.add_lun(pl.lun, pl.raid_group);
    }
    let mut h = harness_with(db);
    let n = h.run(JobPayload::NduCommit(NduCommit{})).await;
    assert_committed(&n);
    {
        let db = h.db();
        for pl in layout::private_luns() {
            assert!(db.luns.values().any(|ls| ls.lun == pl.lun),
                "private LUN {} was not created", pl.lun);
        }
        assert_eq!(db.committed.len(), 1);
    }
    h.shutdown().await;
}
