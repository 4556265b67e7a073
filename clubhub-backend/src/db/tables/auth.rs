//! Login session database operations (auth_sessions)

use chrono::{Duration, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use crate::auth::generate_session_token;
use crate::models::{parse_timestamp, AccountType, Session};

/// How long a login token stays valid
pub const SESSION_TTL_HOURS: i64 = 24;

impl Database {
    /// Create a new login session for an account. Sessions that have already
    /// expired are purged first.
    pub fn create_session(&self, account_type: AccountType, account_id: i64) -> SqliteResult<Session> {
        let conn = self.conn()?;
        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = now + Duration::hours(SESSION_TTL_HOURS);

        // Timestamps are all UTC rfc3339, so text order is time order
        let purged = conn.execute(
            "DELETE FROM auth_sessions WHERE expires_at < ?1",
            [now.to_rfc3339()],
        )?;
        if purged > 0 {
            log::debug!("Purged {} expired sessions", purged);
        }

        conn.execute(
            "INSERT INTO auth_sessions (token, account_type, account_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                token,
                account_type.as_ref(),
                account_id,
                now.to_rfc3339(),
                expires_at.to_rfc3339()
            ],
        )?;

        Ok(Session {
            id: conn.last_insert_rowid(),
            token,
            account_type,
            account_id,
            created_at: now,
            expires_at,
        })
    }

    /// Look up a session by token. Expired sessions are removed and yield `None`.
    pub fn validate_session(&self, token: &str) -> SqliteResult<Option<Session>> {
        let conn = self.conn()?;

        let session = conn
            .query_row(
                "SELECT id, token, account_type, account_id, created_at, expires_at
                 FROM auth_sessions WHERE token = ?1",
                [token],
                Self::row_to_session,
            )
            .optional()?;

        match session {
            Some(s) if s.expires_at <= Utc::now() => {
                conn.execute("DELETE FROM auth_sessions WHERE id = ?1", [s.id])?;
                log::debug!("Removed expired session {}", s.id);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Delete a session (logout). Returns whether a session was removed.
    pub fn delete_session(&self, token: &str) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        Ok(rows_affected > 0)
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
        let account_type: String = row.get(2)?;
        let created_at: String = row.get(4)?;
        let expires_at: String = row.get(5)?;

        Ok(Session {
            id: row.get(0)?,
            token: row.get(1)?,
            account_type: account_type.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
            })?,
            account_id: row.get(3)?,
            created_at: parse_timestamp(4, &created_at)?,
            expires_at: parse_timestamp(5, &expires_at)?,
        })
    }
}
