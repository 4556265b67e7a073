//! SQLite connection pool and schema management

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result as SqliteResult;

/// A pooled connection checked out for the duration of one database operation
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Database handle shared across request handlers.
///
/// Every table module adds its own `impl Database` block under `db::tables`.
/// Each operation checks out one connection and returns it to the pool when
/// the operation finishes.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (or create) the database at `database_url` and initialize the schema.
    ///
    /// `":memory:"` opens a private in-memory database backed by a single
    /// connection so that every caller sees the same data.
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        let in_memory = database_url == ":memory:";

        let manager = if in_memory {
            SqliteConnectionManager::memory()
        } else {
            if let Some(parent) = Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        log::warn!("Failed to create database directory {:?}: {}", parent, e);
                    }
                }
            }
            SqliteConnectionManager::file(database_url)
        }
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let max_size = if in_memory { 1 } else { 8 };
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| pool_error(rusqlite::ffi::SQLITE_CANTOPEN, e))?;

        let db = Self { pool };
        db.init()?;
        Ok(db)
    }

    /// Check out a connection from the pool.
    ///
    /// Blocks until one is free, up to r2d2's connection timeout (30s).
    pub fn conn(&self) -> SqliteResult<DbConn> {
        self.pool
            .get()
            .map_err(|e| pool_error(rusqlite::ffi::SQLITE_BUSY, e))
    }

    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn()?;
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode = WAL;") {
            log::debug!("WAL journal mode not applied: {}", e);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                field_of_study TEXT,
                year_level INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS student_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id INTEGER NOT NULL UNIQUE REFERENCES students(id) ON DELETE CASCADE,
                bio TEXT,
                goals TEXT,
                notification_preferences TEXT,
                last_updated TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS clubs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                description TEXT,
                mission TEXT,
                history TEXT,
                contact_email TEXT,
                website TEXT,
                logo_url TEXT,
                personality_style TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                club_id INTEGER NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                event_type TEXT,
                location TEXT,
                date TEXT,
                deadline TEXT,
                max_seats INTEGER,
                current_registrations INTEGER NOT NULL DEFAULT 0,
                view_count INTEGER NOT NULL DEFAULT 0,
                is_trending INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_club ON events(club_id);

            CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                category TEXT
            );

            CREATE TABLE IF NOT EXISTS student_skills (
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
                PRIMARY KEY (student_id, skill_id)
            );

            CREATE TABLE IF NOT EXISTS student_clubs (
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                club_id INTEGER NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                joined_at TEXT NOT NULL,
                PRIMARY KEY (student_id, club_id)
            );

            CREATE TABLE IF NOT EXISTS event_registrations (
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
                registered_at TEXT NOT NULL,
                PRIMARY KEY (student_id, event_id)
            );

            CREATE TABLE IF NOT EXISTS auth_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT NOT NULL UNIQUE,
                account_type TEXT NOT NULL,
                account_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );",
        )?;

        log::debug!("Database schema initialized");
        Ok(())
    }
}

fn pool_error(code: std::os::raw::c_int, e: r2d2::Error) -> rusqlite::Error {
    log::error!("Database pool error: {}", e);
    rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), Some(e.to_string()))
}
