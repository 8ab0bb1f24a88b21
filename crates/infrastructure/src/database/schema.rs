use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tariff_plans (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        duration_hours INTEGER NOT NULL,
        price REAL NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bracelets (
        id TEXT PRIMARY KEY,
        bracelet_code TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'available',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS parents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL UNIQUE,
        email TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS children (
        id TEXT PRIMARY KEY,
        name TEXT,
        parent_id TEXT NOT NULL REFERENCES parents(id),
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bracelet_sessions (
        id TEXT PRIMARY KEY,
        bracelet_id TEXT NOT NULL REFERENCES bracelets(id),
        child_id TEXT NOT NULL REFERENCES children(id),
        parent_id TEXT NOT NULL REFERENCES parents(id),
        tariff_plan_id TEXT NOT NULL REFERENCES tariff_plans(id),
        start_time TEXT NOT NULL,
        end_time TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        status TEXT NOT NULL DEFAULT 'inside',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS entry_log (
        id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL REFERENCES bracelet_sessions(id),
        action TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        notes TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_sessions_active ON bracelet_sessions (is_active, start_time)",
    "CREATE INDEX IF NOT EXISTS idx_entry_log_session ON entry_log (session_id, timestamp)",
];

/// Stock plans: name, description, hours, price
const DEFAULT_TARIFFS: &[(&str, &str, i64, f64)] = &[
    ("1 Day", "Unlimited play for the whole day", 24, 500.0),
    ("2 Hours", "Two hours in the play area", 2, 200.0),
    ("4 Hours", "Four hours in the play area", 4, 350.0),
];

pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Insert the stock tariff plans when the table is empty
///
/// Returns how many plans were inserted.
pub async fn seed_default_tariffs(pool: &Pool<Sqlite>) -> Result<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tariff_plans")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    for (name, description, hours, price) in DEFAULT_TARIFFS {
        sqlx::query(
            "INSERT INTO tariff_plans (id, name, description, duration_hours, price, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(*name)
        .bind(*description)
        .bind(*hours)
        .bind(*price)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(count = DEFAULT_TARIFFS.len(), "Seeded default tariff plans");
    Ok(DEFAULT_TARIFFS.len())
}
