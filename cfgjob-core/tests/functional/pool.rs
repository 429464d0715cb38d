// vim: tw=80

use cfgjob_core::{
    job::{CreateExtentPool, DestroyExtentPool, JobPayload},
    types::*,
};

use super::*;

#[tokio::test]
async fn create_pool_end_to_end() {
    let mut db = FakeDb::new();
    let a = db.add_drive(5, "A", PvdConfigType::Unconsumed);
    let b = db.add_drive(6, "B", PvdConfigType::Unconsumed);
    let mut h = harness_with(db);
    let n = h.run(JobPayload::CreateExtentPool(CreateExtentPool {
        pool: PoolId(2),
        drives: vec![a, b],
    })).await;
    assert_committed(&n);
    {
        let db = h.db();
        let (pool_oid, ps) = db.pools.iter().next().unwrap();
        assert_eq!(ps.pool, PoolId(2));
        assert_eq!(ps.members, vec![a, b]);
        assert!(ps.metadata_lun.is_valid());
        assert_eq!(n.object, *pool_oid);
        for oid in [a, b] {
            assert_eq!(db.drives[&oid].config_type, PvdConfigType::ExtPool);
            assert_eq!(db.drives[&oid].pool, PoolId(2));
        }
        assert_eq!(db.committed.len(), 1);
    }
    h.shutdown().await;
}

#[tokio::test]
async fn create_pool_with_consumed_drive() {
    let mut db = FakeDb::new();
    let a = db.add_drive(5, "A", PvdConfigType::Raid);
    let mut h = harness_with(db);
    let n = h.run(JobPayload::CreateExtentPool(CreateExtentPool {
        pool: PoolId(2),
        drives: vec![a],
    })).await;
    assert_rolled_back(&n, Error::PvdInUseForRaidGroup);
    assert!(h.db().pools.is_empty());
    h.shutdown().await;
}

#[tokio::test]
async fn create_pool_with_taken_id() {
    let mut db = FakeDb::new();
    let a = db.add_drive(5, "A", PvdConfigType::Unconsumed);
    let b = db.add_drive(6, "B", PvdConfigType::Unconsumed);
    db.add_pool(PoolId(2), vec![a]);
    let mut h = harness_with(db);
    let n = h.run(JobPayload::CreateExtentPool(CreateExtentPool {
        pool: PoolId(2),
        drives: vec![b],
    })).await;
    assert_rolled_back(&n, Error::InvalidValue);
    h.shutdown().await;
}

#[tokio::test]
async fn destroy_pool_releases_members() {
    let mut db = FakeDb::new();
    let a = db.add_drive(5, "A", PvdConfigType::Unconsumed);
    let b = db.add_drive(6, "B", PvdConfigType::Unconsumed);
    let pool_oid = db.add_pool(PoolId(2), vec![a, b]);
    let md_lun = db.pools[&pool_oid].metadata_lun;
    let mut h = harness_with(db);
    let n = h.run(JobPayload::DestroyExtentPool(DestroyExtentPool {
        pool: PoolId(2),
    })).await;
    assert_committed(&n);
    {
        let db = h.db();
        assert!(db.pools.is_empty());
        assert!(!db.luns.contains_key(&md_lun));
        for oid in [a, b] {
            assert_eq!(db.drives[&oid].config_type,
                       PvdConfigType::Unconsumed);
            assert_eq!(db.drives[&oid].pool, PoolId::INVALID);
        }
    }
    h.shutdown().await;
}

/// A pool with any consumer beyond its metadata LUN holds user data and
/// must not be destroyed.
#[tokio::test]
async fn destroy_pool_with_user_luns() {
    let mut db = FakeDb::new();
    let a = db.add_drive(5, "A", PvdConfigType::Unconsumed);
    let pool_oid = db.add_pool(PoolId(2), vec![a]);
    db.add_lun(LunNumber(10), pool_oid);
    db.pools.get_mut(&pool_oid).unwrap().upstream_edges = 2;
    let mut h = harness_with(db);
    let n = h.run(JobPayload::DestroyExtentPool(DestroyExtentPool {
        pool: PoolId(2),
    })).await;
    assert_rolled_back(&n, Error::HasUpstreamEdges);
    assert_eq!(h.db().pools.len(), 1);
    h.shutdown().await;
}

#[tokio::test]
async fn destroy_unknown_pool() {
    let mut h = harness();
    let n = h.run(JobPayload::DestroyExtentPool(DestroyExtentPool {
        pool: PoolId(9),
    })).await;
    assert_rolled_back(&n, Error::UnknownId);
    h.shutdown().await;
}
