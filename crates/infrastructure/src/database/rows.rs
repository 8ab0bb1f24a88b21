use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use domain::{
    Bracelet, BraceletCode, BraceletSession, BraceletStatus, Child, DomainError, EntryAction,
    EntryLog, Parent, SessionStatus, SessionWithDetails, TariffPlan,
};

/// Joined projection used by every session query
pub const SESSION_SELECT: &str = "SELECT
        s.id AS s_id, s.bracelet_id, s.child_id, s.parent_id, s.tariff_plan_id,
        s.start_time, s.end_time, s.is_active, s.status,
        s.created_at AS s_created_at, s.updated_at AS s_updated_at,
        b.bracelet_code, b.status AS b_status,
        b.created_at AS b_created_at, b.updated_at AS b_updated_at,
        c.name AS c_name, c.created_at AS c_created_at,
        p.name AS p_name, p.phone AS p_phone, p.email AS p_email, p.created_at AS p_created_at,
        t.id AS t_id, t.name AS t_name, t.description AS t_description,
        t.duration_hours AS t_duration_hours, t.price AS t_price, t.created_at AS t_created_at
    FROM bracelet_sessions s
    JOIN bracelets b ON b.id = s.bracelet_id
    JOIN children c ON c.id = s.child_id
    JOIN parents p ON p.id = s.parent_id
    LEFT JOIN tariff_plans t ON t.id = s.tariff_plan_id";

pub fn gateway_error(e: sqlx::Error) -> DomainError {
    DomainError::Gateway(e.to_string())
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| DomainError::InvalidData(format!("column {name}: {e}")))
}

fn hours(value: i64) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::InvalidData(format!("duration_hours out of range: {value}")))
}

pub fn tariff_from_row(row: &SqliteRow) -> Result<TariffPlan, DomainError> {
    Ok(TariffPlan {
        id: column(row, "id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        duration_hours: hours(column(row, "duration_hours")?)?,
        price: column(row, "price")?,
        created_at: column(row, "created_at")?,
    })
}

pub fn entry_log_from_row(row: &SqliteRow) -> Result<EntryLog, DomainError> {
    let action: String = column(row, "action")?;
    Ok(EntryLog {
        id: column(row, "id")?,
        session_id: column(row, "session_id")?,
        action: EntryAction::parse(&action)
            .ok_or_else(|| DomainError::InvalidData(format!("unknown entry action: {action}")))?,
        timestamp: column(row, "timestamp")?,
        notes: column(row, "notes")?,
    })
}

/// Session with its joined relations; entry logs are attached separately
pub fn session_from_row(row: &SqliteRow) -> Result<SessionWithDetails, DomainError> {
    let status: String = column(row, "status")?;
    let bracelet_status: String = column(row, "b_status")?;
    let code: String = column(row, "bracelet_code")?;

    let session = BraceletSession {
        id: column(row, "s_id")?,
        bracelet_id: column(row, "bracelet_id")?,
        child_id: column(row, "child_id")?,
        parent_id: column(row, "parent_id")?,
        tariff_plan_id: column(row, "tariff_plan_id")?,
        start_time: column(row, "start_time")?,
        end_time: column(row, "end_time")?,
        is_active: column(row, "is_active")?,
        status: SessionStatus::parse(&status)
            .ok_or_else(|| DomainError::InvalidData(format!("unknown session status: {status}")))?,
        created_at: column(row, "s_created_at")?,
        updated_at: column(row, "s_updated_at")?,
    };

    let bracelet = Bracelet {
        id: session.bracelet_id.clone(),
        code: BraceletCode::new(code)?,
        status: BraceletStatus::parse(&bracelet_status).ok_or_else(|| {
            DomainError::InvalidData(format!("unknown bracelet status: {bracelet_status}"))
        })?,
        created_at: column(row, "b_created_at")?,
        updated_at: column(row, "b_updated_at")?,
    };

    let child = Child {
        id: session.child_id.clone(),
        name: column(row, "c_name")?,
        parent_id: session.parent_id.clone(),
        created_at: column(row, "c_created_at")?,
    };

    let parent = Parent {
        id: session.parent_id.clone(),
        name: column(row, "p_name")?,
        phone: column(row, "p_phone")?,
        email: column(row, "p_email")?,
        created_at: column(row, "p_created_at")?,
    };

    let tariff_id: Option<String> = column(row, "t_id")?;
    let tariff_plan = match tariff_id {
        Some(id) => {
            let created_at: DateTime<Utc> = column(row, "t_created_at")?;
            Some(TariffPlan {
                id,
                name: column(row, "t_name")?,
                description: column(row, "t_description")?,
                duration_hours: hours(column(row, "t_duration_hours")?)?,
                price: column(row, "t_price")?,
                created_at,
            })
        }
        None => None,
    };

    Ok(SessionWithDetails {
        session,
        bracelet,
        child,
        parent,
        tariff_plan,
        entry_logs: Vec::new(),
    })
}
