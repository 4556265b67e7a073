//! Club database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use super::{stored_password_hash, PartialUpdate};
use crate::models::{parse_timestamp, Club, ClubMember, CreateClubRequest, UpdateClubRequest};

const CLUB_COLUMNS: &str = "id, name, email, password_hash, description, mission, history, \
     contact_email, website, logo_url, personality_style, created_at, updated_at";

impl Database {
    pub fn create_club(&self, request: &CreateClubRequest) -> SqliteResult<Club> {
        let password_hash = stored_password_hash(&request.password)?;
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO clubs (name, email, password_hash, description, mission, history,
                                contact_email, website, logo_url, personality_style, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            rusqlite::params![
                request.name,
                request.email,
                password_hash,
                request.description,
                request.mission,
                request.history,
                request.contact_email,
                request.website,
                request.logo_url,
                request.personality_style,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        log::info!("Created club {} ({})", id, request.name);
        self.get_club(id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn get_club(&self, id: i64) -> SqliteResult<Option<Club>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM clubs WHERE id = ?1", CLUB_COLUMNS),
            [id],
            Self::row_to_club,
        )
        .optional()
    }

    pub fn get_club_by_email(&self, email: &str) -> SqliteResult<Option<Club>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM clubs WHERE email = ?1", CLUB_COLUMNS),
            [email],
            Self::row_to_club,
        )
        .optional()
    }

    pub fn list_clubs(&self) -> SqliteResult<Vec<Club>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM clubs ORDER BY name", CLUB_COLUMNS))?;
        let clubs = stmt
            .query_map([], Self::row_to_club)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(clubs)
    }

    /// Apply a partial update. Returns `None` if the club does not exist.
    pub fn update_club(&self, id: i64, request: &UpdateClubRequest) -> SqliteResult<Option<Club>> {
        let password_hash = request.password.as_deref().map(stored_password_hash).transpose()?;
        let conn = self.conn()?;

        let mut update = PartialUpdate::new("clubs");
        update
            .set_opt("name", &request.name)
            .set_opt("email", &request.email)
            .set_opt("password_hash", &password_hash)
            .set_opt("description", &request.description)
            .set_opt("mission", &request.mission)
            .set_opt("history", &request.history)
            .set_opt("contact_email", &request.contact_email)
            .set_opt("website", &request.website)
            .set_opt("logo_url", &request.logo_url)
            .set_opt("personality_style", &request.personality_style)
            .set("updated_at", Utc::now().to_rfc3339());

        let rows = update.execute(&conn, id)?;
        drop(conn);

        if rows == 0 {
            return Ok(None);
        }
        self.get_club(id)
    }

    /// Delete a club; its events and memberships cascade
    pub fn delete_club(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM clubs WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    pub fn list_club_members(&self, club_id: i64) -> SqliteResult<Vec<ClubMember>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.field_of_study, sc.joined_at
             FROM student_clubs sc
             JOIN students s ON s.id = sc.student_id
             WHERE sc.club_id = ?1
             ORDER BY sc.joined_at, s.id",
        )?;
        let members = stmt
            .query_map([club_id], |row| {
                let joined_at: String = row.get(3)?;
                Ok(ClubMember {
                    student_id: row.get(0)?,
                    name: row.get(1)?,
                    field_of_study: row.get(2)?,
                    joined_at: parse_timestamp(3, &joined_at)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(members)
    }

    pub(crate) fn row_to_club(row: &rusqlite::Row) -> rusqlite::Result<Club> {
        let created_at: String = row.get(11)?;
        let updated_at: String = row.get(12)?;
        Ok(Club {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            description: row.get(4)?,
            mission: row.get(5)?,
            history: row.get(6)?,
            contact_email: row.get(7)?,
            website: row.get(8)?,
            logo_url: row.get(9)?,
            personality_style: row.get(10)?,
            created_at: parse_timestamp(11, &created_at)?,
            updated_at: parse_timestamp(12, &updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robotics() -> CreateClubRequest {
        CreateClubRequest {
            name: "Robotics Club".to_string(),
            email: "robotics@uni.edu".to_string(),
            password: "clubpass".to_string(),
            description: Some("We build robots".to_string()),
            mission: Some("Hands-on engineering".to_string()),
            history: None,
            contact_email: Some("contact@robotics.uni.edu".to_string()),
            website: None,
            logo_url: None,
            personality_style: Some("enthusiastic".to_string()),
        }
    }

    #[test]
    fn test_update_club_with_unset_field_leaves_it_unchanged() {
        let db = Database::new(":memory:").unwrap();
        let club = db.create_club(&robotics()).unwrap();

        let updated = db
            .update_club(
                club.id,
                &UpdateClubRequest {
                    website: Some(Some("https://robotics.uni.edu".to_string())),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.website.as_deref(), Some("https://robotics.uni.edu"));
        assert_eq!(updated.description, club.description);
        assert_eq!(updated.mission, club.mission);
        assert_eq!(updated.personality_style, club.personality_style);
        assert_eq!(updated.name, club.name);
        assert_eq!(updated.password_hash, club.password_hash);
    }

    #[test]
    fn test_update_missing_club_returns_none() {
        let db = Database::new(":memory:").unwrap();
        assert!(db
            .update_club(42, &UpdateClubRequest::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_get_club_by_email_and_delete() {
        let db = Database::new(":memory:").unwrap();
        let club = db.create_club(&robotics()).unwrap();
        assert_eq!(db.get_club_by_email("robotics@uni.edu").unwrap().unwrap().id, club.id);

        assert!(db.delete_club(club.id).unwrap());
        assert!(db.get_club(club.id).unwrap().is_none());
        assert!(!db.delete_club(club.id).unwrap());
    }

    #[test]
    fn test_duplicate_club_email_rejected_by_schema() {
        let db = Database::new(":memory:").unwrap();
        db.create_club(&robotics()).unwrap();
        assert!(db.create_club(&robotics()).is_err());
        assert_eq!(db.list_clubs().unwrap().len(), 1);
    }
}
