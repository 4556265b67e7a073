pub mod auth;
pub mod clubs;
pub mod events;
pub mod profiles;
pub mod skills;
pub mod students;

use rusqlite::{Connection, ToSql};

use crate::auth::hash_password;

/// Hash a password for a `password_hash` column, as a rusqlite error on failure
pub(crate) fn stored_password_hash(password: &str) -> rusqlite::Result<String> {
    hash_password(password).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Builds `UPDATE <table> SET ... WHERE <key> = ?N` from the fields a partial
/// update request actually carries.
///
/// Nullable columns use `Option<Option<T>>` request fields: `None` leaves the
/// column alone, `Some(None)` writes NULL.
pub(crate) struct PartialUpdate {
    table: &'static str,
    key: &'static str,
    assignments: Vec<String>,
    conditions: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl PartialUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            key: "id",
            assignments: Vec::new(),
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Match rows on `key` instead of `id`
    pub fn keyed_by(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    /// Always assign `column`
    pub fn set<T: ToSql + 'static>(&mut self, column: &str, value: T) -> &mut Self {
        self.params.push(Box::new(value));
        self.assignments
            .push(format!("{} = ?{}", column, self.params.len()));
        self
    }

    /// Assign `column` only when the request carried a value for it
    pub fn set_opt<T: ToSql + Clone + 'static>(&mut self, column: &str, value: &Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v.clone());
        }
        self
    }

    /// Extra condition the row must satisfy. Every `{}` in `condition` is
    /// replaced by the placeholder bound to `value`.
    pub fn require<T: ToSql + 'static>(&mut self, condition: &str, value: T) -> &mut Self {
        self.params.push(Box::new(value));
        let placeholder = format!("?{}", self.params.len());
        self.conditions.push(condition.replace("{}", &placeholder));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Run the update against the row whose key is `id`, returning the number
    /// of rows touched (0 when the row is missing or a condition fails)
    pub fn execute(mut self, conn: &Connection, id: i64) -> rusqlite::Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        self.params.push(Box::new(id));
        let mut sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            self.table,
            self.assignments.join(", "),
            self.key,
            self.params.len()
        );
        for condition in &self.conditions {
            sql.push_str(" AND (");
            sql.push_str(condition);
            sql.push(')');
        }
        let params_ref: Vec<&dyn ToSql> = self.params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_ref.as_slice())
    }
}
