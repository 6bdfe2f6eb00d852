//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use tracing::debug;

use super::{
    Responsible, State, StoreError, Ticket, TicketStore, TicketType, OLD_ANY_DAYS,
    OLD_ASSIGNED_DAYS, OLD_NEW_DAYS,
};

const TICKET_COLUMNS: &str =
    "id, name, description, ticket_type, state, responsible, date_created";

/// SQLite-backed ticket store.
///
/// Closed tickets stay in the `ticket` table flagged `closed`. The `backlog`
/// and `deleted_backlog` tables track open and closed ids alongside; they are
/// written in the same transaction as the ticket row but never read back.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

/// Raw column values of a `ticket` row.
struct TicketRow {
    id: String,
    name: String,
    description: String,
    ticket_type: String,
    state: String,
    responsible: String,
    date_created: String,
}

impl TicketRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            ticket_type: row.get(3)?,
            state: row.get(4)?,
            responsible: row.get(5)?,
            date_created: row.get(6)?,
        })
    }

    fn into_ticket(self) -> Result<Ticket, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRow {
            id: self.id.clone(),
            reason,
        };

        let ticket_type = TicketType::from_value(&self.ticket_type)
            .ok_or_else(|| corrupt(format!("unknown ticket type {:?}", self.ticket_type)))?;
        let state = State::from_value(&self.state)
            .ok_or_else(|| corrupt(format!("unknown state {:?}", self.state)))?;
        let responsible = Responsible::from_value(&self.responsible)
            .ok_or_else(|| corrupt(format!("unknown responsible {:?}", self.responsible)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.date_created)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt(format!("bad date_created: {}", e)))?;

        Ok(Ticket {
            id: self.id,
            name: self.name,
            details: self.description,
            ticket_type,
            state,
            responsible,
            created_at,
        })
    }
}

/// Fixed-width UTC timestamp, so lexical order in SQL matches time order.
fn to_db_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Cutoff timestamp for "at least `days` whole days old".
fn age_cutoff(days: i64) -> String {
    to_db_time(Utc::now() - TimeDelta::days(days))
}

/// `%keyword%` with LIKE metacharacters escaped, for a literal substring match.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        debug!("Opened ticket database at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Close the underlying connection, surfacing any error from SQLite.
    pub fn disconnect(self) -> Result<(), StoreError> {
        let conn = self.conn.into_inner().map_err(|_| StoreError::Poisoned)?;
        conn.close().map_err(|(_, e)| StoreError::from(e))
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA case_sensitive_like = ON;

            CREATE TABLE IF NOT EXISTS ticket (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                ticket_type TEXT NOT NULL,
                state TEXT NOT NULL,
                responsible TEXT NOT NULL,
                date_created TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS backlog (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date_created TEXT NOT NULL,
                ticket_id TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES ticket(id)
            );

            CREATE TABLE IF NOT EXISTS deleted_backlog (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date_created TEXT NOT NULL,
                ticket_id TEXT NOT NULL,
                FOREIGN KEY (ticket_id) REFERENCES ticket(id)
            );

            CREATE INDEX IF NOT EXISTS idx_ticket_state ON ticket(state);
            CREATE INDEX IF NOT EXISTS idx_ticket_date_created ON ticket(date_created);
            CREATE INDEX IF NOT EXISTS idx_backlog_ticket_id ON backlog(ticket_id);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn query_tickets(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Ticket>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, TicketRow::from_row)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result?.into_ticket()?);
        }
        Ok(tickets)
    }

    fn old_in_state(&self, state: State, days: i64) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {} FROM ticket WHERE state = ?1 AND date_created <= ?2 ORDER BY date_created ASC",
            TICKET_COLUMNS
        );
        self.query_tickets(&sql, &[&state.as_str(), &age_cutoff(days)])
    }
}

impl TicketStore for SqliteTicketStore {
    fn search(&self, keyword: &str) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {} FROM ticket WHERE state != ?1 AND (\
                id LIKE ?2 ESCAPE '\\' \
                OR name LIKE ?2 ESCAPE '\\' \
                OR description LIKE ?2 ESCAPE '\\' \
                OR ticket_type LIKE ?2 ESCAPE '\\' \
                OR state LIKE ?2 ESCAPE '\\' \
                OR responsible LIKE ?2 ESCAPE '\\') \
             ORDER BY date_created ASC",
            TICKET_COLUMNS
        );
        self.query_tickets(&sql, &[&State::Closed.as_str(), &like_pattern(keyword)])
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM ticket WHERE id = ?1 AND state != ?2",
            TICKET_COLUMNS
        );
        let row = conn
            .query_row(&sql, params![id, State::Closed.as_str()], TicketRow::from_row)
            .optional()?;
        row.map(TicketRow::into_ticket).transpose()
    }

    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ticket WHERE id = ?1 AND state != ?2",
            params![id, State::Closed.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let created = to_db_time(ticket.created_at);

        // A closed row with the same id is replaced; an open one is left alone.
        let inserted = tx.execute(
            "INSERT INTO ticket (id, name, description, ticket_type, state, responsible, date_created) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(id) DO UPDATE SET \
                name = excluded.name, \
                description = excluded.description, \
                ticket_type = excluded.ticket_type, \
                state = excluded.state, \
                responsible = excluded.responsible, \
                date_created = excluded.date_created \
             WHERE ticket.state = ?8",
            params![
                ticket.id,
                ticket.name,
                ticket.details,
                ticket.ticket_type.as_str(),
                ticket.state.as_str(),
                ticket.responsible.as_str(),
                created,
                State::Closed.as_str(),
            ],
        )?;
        if inserted == 0 {
            debug!("Refusing duplicate ticket id {}", ticket.id);
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO backlog (date_created, ticket_id) VALUES (?1, ?2)",
            params![created, ticket.id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn update(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE ticket SET name = ?1, description = ?2, ticket_type = ?3, state = ?4, responsible = ?5 \
             WHERE id = ?6 AND state != ?7",
            params![
                ticket.name,
                ticket.details,
                ticket.ticket_type.as_str(),
                ticket.state.as_str(),
                ticket.responsible.as_str(),
                ticket.id,
                State::Closed.as_str(),
            ],
        )?;
        Ok(updated > 0)
    }

    fn close(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let closed = tx.execute(
            "UPDATE ticket SET state = ?1 WHERE id = ?2 AND state != ?1",
            params![State::Closed.as_str(), ticket.id],
        )?;
        if closed == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM backlog WHERE ticket_id = ?1",
            params![ticket.id],
        )?;
        tx.execute(
            "INSERT INTO deleted_backlog (date_created, ticket_id) VALUES (?1, ?2)",
            params![to_db_time(Utc::now()), ticket.id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn old_new(&self) -> Result<Vec<Ticket>, StoreError> {
        self.old_in_state(State::New, OLD_NEW_DAYS)
    }

    fn old_assigned(&self) -> Result<Vec<Ticket>, StoreError> {
        self.old_in_state(State::Assigned, OLD_ASSIGNED_DAYS)
    }

    fn old_all(&self) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {} FROM ticket WHERE state != ?1 AND date_created <= ?2 ORDER BY date_created ASC",
            TICKET_COLUMNS
        );
        self.query_tickets(&sql, &[&State::Closed.as_str(), &age_cutoff(OLD_ANY_DAYS)])
    }
}
