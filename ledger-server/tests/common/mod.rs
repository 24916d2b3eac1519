//! Shared test fixtures: temp-file SQLite with migrations applied, an
//! in-memory SMS gateway, and seed helpers.

#![allow(dead_code)]

use std::sync::Arc;

use ledger_server::db::DbService;
use ledger_server::db::repository::{debtor, identity, store};
use ledger_server::{Config, MemorySms};
use shared::models::{Debtor, DebtorCreate, Store};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestEnv {
    pub pool: SqlitePool,
    pub sms: Arc<MemorySms>,
    pub config: Config,
    // Keeps the database directory alive for the test's duration.
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ledger-test.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("test database");
    TestEnv {
        pool: db.pool,
        sms: Arc::new(MemorySms::new()),
        config: Config::default(),
        _dir: dir,
    }
}

pub async fn seed_identity(pool: &SqlitePool, name: &str, phone: Option<&str>) -> i64 {
    let id = shared::util::snowflake_id();
    identity::create(pool, id, phone, name, None, "tg")
        .await
        .expect("seed identity");
    id
}

pub async fn seed_store(pool: &SqlitePool, owner_identity_id: i64) -> Store {
    store::create(pool, "Test Store", owner_identity_id)
        .await
        .expect("seed store")
}

pub async fn seed_debtor(pool: &SqlitePool, store_id: i64, created_by: i64) -> Debtor {
    debtor::create(
        pool,
        store_id,
        created_by,
        DebtorCreate {
            name: "Firdavs".to_string(),
            phone: Some("900112233".to_string()),
        },
    )
    .await
    .expect("seed debtor")
}

/// Make a store eligible for reminders: verified with an active plan.
pub async fn activate_store(pool: &SqlitePool, store_id: i64) {
    store::set_verified(pool, store_id, true)
        .await
        .expect("verify store");
    let end_at = shared::util::now_millis() + 30 * 24 * 60 * 60 * 1000;
    store::apply_subscription(
        pool,
        store_id,
        shared::models::SubscriptionPlan::Standard,
        end_at,
    )
    .await
    .expect("subscribe store");
}
