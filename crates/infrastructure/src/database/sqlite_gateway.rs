use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, info};
use uuid::Uuid;

use domain::{
    BraceletCode, BraceletStatus, DomainError, EntryAction, Registration, SessionGateway,
    SessionStatus, SessionWithDetails, TariffPlan, ToggleOutcome,
};

use super::rows::{
    SESSION_SELECT, entry_log_from_row, gateway_error, session_from_row, tariff_from_row,
};
use super::schema;

const REGISTRATION_NOTE: &str = "Initial entry - registration";

/// `SessionGateway` backed by a local SQLite database
///
/// Registration and toggling each run inside a single transaction, so a
/// failure part way leaves no rows behind.
#[derive(Clone)]
pub struct SqliteSessionGateway {
    pool: Pool<Sqlite>,
}

impl SqliteSessionGateway {
    pub async fn new(connection_string: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1) // SQLite is single-writer
            .connect(connection_string)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the schema exists
    pub async fn from_pool(pool: Pool<Sqlite>) -> anyhow::Result<Self> {
        schema::create_schema(&pool).await?;
        info!("Session schema ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn seed_default_tariffs(&self) -> anyhow::Result<usize> {
        schema::seed_default_tariffs(&self.pool).await
    }

    /// Add a tariff plan outside of the stock set
    pub async fn insert_tariff_plan(&self, plan: &TariffPlan) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO tariff_plans (id, name, description, duration_hours, price, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(i64::from(plan.duration_hours))
        .bind(plan.price)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await
        .map_err(gateway_error)?;
        Ok(())
    }

    /// Any session, active or not, with its entry logs
    pub async fn find_session(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionWithDetails>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(gateway_error)?;
        fetch_session(&mut *conn, session_id).await
    }

    /// Sessions started at or after `since`, ended ones included
    pub async fn sessions_since(
        &self,
        since: chrono::DateTime<Utc>,
    ) -> Result<Vec<SessionWithDetails>, DomainError> {
        let sql = format!("{SESSION_SELECT} WHERE s.start_time >= ? ORDER BY s.start_time DESC");
        let mut conn = self.pool.acquire().await.map_err(gateway_error)?;
        let rows = sqlx::query(&sql)
            .bind(since)
            .fetch_all(&mut *conn)
            .await
            .map_err(gateway_error)?;
        let sessions = rows
            .iter()
            .map(session_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        attach_logs(&mut *conn, sessions).await
    }
}

async fn fetch_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Option<SessionWithDetails>, DomainError> {
    let sql = format!("{SESSION_SELECT} WHERE s.id = ?");
    let row = sqlx::query(&sql)
        .bind(session_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(gateway_error)?;

    match row {
        Some(row) => {
            let session = session_from_row(&row)?;
            Ok(attach_logs(conn, vec![session]).await?.pop())
        }
        None => Ok(None),
    }
}

/// Load entry logs for every session in one query, oldest first; equal
/// timestamps keep insertion order
async fn attach_logs(
    conn: &mut SqliteConnection,
    mut sessions: Vec<SessionWithDetails>,
) -> Result<Vec<SessionWithDetails>, DomainError> {
    if sessions.is_empty() {
        return Ok(sessions);
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, session_id, action, timestamp, notes FROM entry_log WHERE session_id IN (",
    );
    let mut ids = qb.separated(", ");
    for session in &sessions {
        ids.push_bind(session.id().to_string());
    }
    ids.push_unseparated(") ORDER BY timestamp ASC, rowid ASC");

    let rows = qb
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(gateway_error)?;

    let mut by_session: HashMap<String, Vec<_>> = HashMap::new();
    for row in &rows {
        let log = entry_log_from_row(row)?;
        by_session.entry(log.session_id.clone()).or_default().push(log);
    }
    for session in &mut sessions {
        if let Some(logs) = by_session.remove(session.id()) {
            session.entry_logs = logs;
        }
    }
    Ok(sessions)
}

/// Escape LIKE wildcards so the query is matched literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl SessionGateway for SqliteSessionGateway {
    async fn list_active_sessions(&self) -> Result<Vec<SessionWithDetails>, DomainError> {
        let sql = format!("{SESSION_SELECT} WHERE s.is_active = 1 ORDER BY s.start_time DESC");
        let mut conn = self.pool.acquire().await.map_err(gateway_error)?;
        let rows = sqlx::query(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(gateway_error)?;

        let sessions = rows
            .iter()
            .map(session_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = sessions.len(), "Fetched active sessions");
        attach_logs(&mut *conn, sessions).await
    }

    async fn search_sessions(&self, query: &str) -> Result<Vec<SessionWithDetails>, DomainError> {
        let sql = format!(
            "{SESSION_SELECT} WHERE s.is_active = 1 AND (
                LOWER(COALESCE(c.name, '')) LIKE ?1 ESCAPE '\\'
                OR LOWER(p.name) LIKE ?1 ESCAPE '\\'
                OR LOWER(p.phone) LIKE ?1 ESCAPE '\\'
                OR LOWER(b.bracelet_code) LIKE ?1 ESCAPE '\\'
            ) ORDER BY s.start_time DESC"
        );
        let mut conn = self.pool.acquire().await.map_err(gateway_error)?;
        let rows = sqlx::query(&sql)
            .bind(like_pattern(query))
            .fetch_all(&mut *conn)
            .await
            .map_err(gateway_error)?;

        let sessions = rows
            .iter()
            .map(session_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(query, count = sessions.len(), "Search finished");
        attach_logs(&mut *conn, sessions).await
    }

    async fn find_active_session_by_code(
        &self,
        code: &BraceletCode,
    ) -> Result<Option<SessionWithDetails>, DomainError> {
        let sql = format!("{SESSION_SELECT} WHERE b.bracelet_code = ? AND s.is_active = 1");
        let mut conn = self.pool.acquire().await.map_err(gateway_error)?;
        let row = sqlx::query(&sql)
            .bind(code.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(gateway_error)?;

        match row {
            Some(row) => {
                let session = session_from_row(&row)?;
                Ok(attach_logs(&mut *conn, vec![session]).await?.pop())
            }
            None => Ok(None),
        }
    }

    async fn toggle_entry(&self, session_id: &str) -> Result<ToggleOutcome, DomainError> {
        let mut tx = self.pool.begin().await.map_err(gateway_error)?;

        let current: Option<(String, bool)> =
            sqlx::query_as("SELECT status, is_active FROM bracelet_sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(gateway_error)?;

        let (status, is_active) =
            current.ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;
        if !is_active {
            return Err(DomainError::SessionInactive(session_id.to_string()));
        }
        let status = SessionStatus::parse(&status)
            .ok_or_else(|| DomainError::InvalidData(format!("unknown session status: {status}")))?;

        let next = status.toggled();
        let action = next.entry_action();
        let now = Utc::now();

        sqlx::query("UPDATE bracelet_sessions SET status = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(now)
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(gateway_error)?;

        sqlx::query("INSERT INTO entry_log (id, session_id, action, timestamp) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(session_id)
            .bind(action.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(gateway_error)?;

        let session = fetch_session(&mut *tx, session_id)
            .await?
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;

        tx.commit().await.map_err(gateway_error)?;
        info!(session_id, action = %action, "Entry toggled");

        Ok(ToggleOutcome { action, session })
    }

    async fn register_bracelet(
        &self,
        registration: &Registration,
    ) -> Result<SessionWithDetails, DomainError> {
        let code = registration.code.as_str();
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(gateway_error)?;

        let tariff_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM tariff_plans WHERE id = ?")
                .bind(&registration.tariff_plan_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(gateway_error)?;
        if tariff_exists.is_none() {
            return Err(DomainError::TariffNotFound(
                registration.tariff_plan_id.clone(),
            ));
        }

        let active: Option<String> = sqlx::query_scalar(
            "SELECT s.id FROM bracelet_sessions s
             JOIN bracelets b ON b.id = s.bracelet_id
             WHERE b.bracelet_code = ? AND s.is_active = 1",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(gateway_error)?;
        if active.is_some() {
            return Err(DomainError::invalid(
                "braceletCode",
                vec!["This bracelet is already registered and active".to_string()],
            ));
        }

        // Bracelet: reuse by code, otherwise create
        let existing: Option<(String, String)> =
            sqlx::query_as("SELECT id, status FROM bracelets WHERE bracelet_code = ?")
                .bind(code)
                .fetch_optional(&mut *tx)
                .await
                .map_err(gateway_error)?;
        let bracelet_id = match existing {
            Some((id, status)) => {
                let usable = BraceletStatus::parse(&status).is_some_and(|s| s.is_usable());
                if !usable {
                    return Err(DomainError::InvalidBraceletCode(format!(
                        "Bracelet {code} is {status}"
                    )));
                }
                sqlx::query("UPDATE bracelets SET status = ?, updated_at = ? WHERE id = ?")
                    .bind(BraceletStatus::Active.as_str())
                    .bind(now)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await
                    .map_err(gateway_error)?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO bracelets (id, bracelet_code, status, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(code)
                .bind(BraceletStatus::Active.as_str())
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(gateway_error)?;
                id
            }
        };

        // Parent: upsert by phone
        let parent_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM parents WHERE phone = ?")
                .bind(&registration.parent_phone)
                .fetch_optional(&mut *tx)
                .await
                .map_err(gateway_error)?;
        let parent_id = match parent_id {
            Some(id) => {
                sqlx::query("UPDATE parents SET name = ?, email = ? WHERE id = ?")
                    .bind(&registration.parent_name)
                    .bind(&registration.parent_email)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await
                    .map_err(gateway_error)?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO parents (id, name, phone, email, created_at) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&registration.parent_name)
                .bind(&registration.parent_phone)
                .bind(&registration.parent_email)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(gateway_error)?;
                id
            }
        };

        let child_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO children (id, name, parent_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&child_id)
            .bind(&registration.child_name)
            .bind(&parent_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(gateway_error)?;

        let session_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO bracelet_sessions (id, bracelet_id, child_id, parent_id, tariff_plan_id,
                start_time, end_time, is_active, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, NULL, 1, ?, ?, ?)",
        )
        .bind(&session_id)
        .bind(&bracelet_id)
        .bind(&child_id)
        .bind(&parent_id)
        .bind(&registration.tariff_plan_id)
        .bind(now)
        .bind(SessionStatus::Inside.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(gateway_error)?;

        sqlx::query(
            "INSERT INTO entry_log (id, session_id, action, timestamp, notes) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&session_id)
        .bind(EntryAction::Enter.as_str())
        .bind(now)
        .bind(REGISTRATION_NOTE)
        .execute(&mut *tx)
        .await
        .map_err(gateway_error)?;

        let session = fetch_session(&mut *tx, &session_id)
            .await?
            .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;

        tx.commit().await.map_err(gateway_error)?;
        info!(session_id = %session_id, code, "Bracelet registered");

        Ok(session)
    }

    async fn end_session(&self, session_id: &str) -> Result<(), DomainError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(gateway_error)?;

        let bracelet: Option<(String, bool)> =
            sqlx::query_as("SELECT bracelet_id, is_active FROM bracelet_sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(gateway_error)?;
        let (bracelet_id, is_active) =
            bracelet.ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;
        if !is_active {
            return Err(DomainError::SessionInactive(session_id.to_string()));
        }

        sqlx::query(
            "UPDATE bracelet_sessions
             SET is_active = 0, end_time = ?, status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(now)
        .bind(SessionStatus::Outside.as_str())
        .bind(now)
        .bind(session_id)
        .execute(&mut *tx)
        .await
        .map_err(gateway_error)?;

        // Release the bracelet for the next visitor
        sqlx::query("UPDATE bracelets SET status = ?, updated_at = ? WHERE id = ?")
            .bind(BraceletStatus::Available.as_str())
            .bind(now)
            .bind(&bracelet_id)
            .execute(&mut *tx)
            .await
            .map_err(gateway_error)?;

        tx.commit().await.map_err(gateway_error)?;
        info!(session_id, "Session ended");
        Ok(())
    }

    async fn list_tariff_plans(&self) -> Result<Vec<TariffPlan>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, name, description, duration_hours, price, created_at
             FROM tariff_plans ORDER BY price ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(gateway_error)?;

        rows.iter().map(tariff_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" Ana "), "%ana%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
