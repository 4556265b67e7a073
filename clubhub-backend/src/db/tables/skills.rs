//! Skill database operations

use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use super::PartialUpdate;
use crate::models::{CreateSkillRequest, Skill, UpdateSkillRequest};

impl Database {
    /// Insert a skill. Names are unique; callers check `get_skill_by_name` first
    /// to report a conflict, the UNIQUE constraint backs that up.
    pub fn create_skill(&self, request: &CreateSkillRequest) -> SqliteResult<Skill> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO skills (name, category) VALUES (?1, ?2)",
            rusqlite::params![request.name, request.category],
        )?;

        Ok(Skill {
            id: conn.last_insert_rowid(),
            name: request.name.clone(),
            category: request.category.clone(),
        })
    }

    pub fn get_skill(&self, id: i64) -> SqliteResult<Option<Skill>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, category FROM skills WHERE id = ?1",
            [id],
            Self::row_to_skill,
        )
        .optional()
    }

    pub fn get_skill_by_name(&self, name: &str) -> SqliteResult<Option<Skill>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, category FROM skills WHERE name = ?1",
            [name],
            Self::row_to_skill,
        )
        .optional()
    }

    pub fn list_skills(&self) -> SqliteResult<Vec<Skill>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, category FROM skills ORDER BY id")?;
        let skills = stmt
            .query_map([], Self::row_to_skill)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(skills)
    }

    pub fn list_skills_by_category(&self, category: &str) -> SqliteResult<Vec<Skill>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, category FROM skills WHERE category = ?1 ORDER BY id")?;
        let skills = stmt
            .query_map([category], Self::row_to_skill)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(skills)
    }

    /// Apply a partial update. Returns `None` if the skill does not exist.
    pub fn update_skill(&self, id: i64, request: &UpdateSkillRequest) -> SqliteResult<Option<Skill>> {
        let conn = self.conn()?;

        let mut update = PartialUpdate::new("skills");
        update
            .set_opt("name", &request.name)
            .set_opt("category", &request.category);

        if update.is_empty() {
            drop(conn);
            return self.get_skill(id);
        }

        let rows = update.execute(&conn, id)?;
        drop(conn);

        if rows == 0 {
            return Ok(None);
        }
        self.get_skill(id)
    }

    pub fn delete_skill(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM skills WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    pub(crate) fn row_to_skill(row: &rusqlite::Row) -> rusqlite::Result<Skill> {
        Ok(Skill {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
        })
    }
}
