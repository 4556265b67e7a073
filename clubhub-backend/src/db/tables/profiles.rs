//! Student profile database operations (student_profiles)

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use super::PartialUpdate;
use crate::models::{parse_timestamp, CreateProfileRequest, StudentProfile, UpdateProfileRequest};

impl Database {
    /// Create the profile for `student_id`.
    ///
    /// The caller checks the student exists and has no profile yet; the UNIQUE
    /// constraint on `student_id` rejects a second profile regardless.
    pub fn create_profile(
        &self,
        student_id: i64,
        request: &CreateProfileRequest,
    ) -> SqliteResult<StudentProfile> {
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO student_profiles (student_id, bio, goals, notification_preferences, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                student_id,
                request.bio,
                request.goals,
                request.notification_preferences,
                now.to_rfc3339()
            ],
        )?;

        Ok(StudentProfile {
            id: conn.last_insert_rowid(),
            student_id,
            bio: request.bio.clone(),
            goals: request.goals.clone(),
            notification_preferences: request.notification_preferences.clone(),
            last_updated: now,
        })
    }

    pub fn get_profile(&self, student_id: i64) -> SqliteResult<Option<StudentProfile>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, student_id, bio, goals, notification_preferences, last_updated
             FROM student_profiles WHERE student_id = ?1",
            [student_id],
            |row| {
                let last_updated: String = row.get(5)?;
                Ok(StudentProfile {
                    id: row.get(0)?,
                    student_id: row.get(1)?,
                    bio: row.get(2)?,
                    goals: row.get(3)?,
                    notification_preferences: row.get(4)?,
                    last_updated: parse_timestamp(5, &last_updated)?,
                })
            },
        )
        .optional()
    }

    /// Apply a partial update and bump `last_updated`. Returns `None` if the
    /// student has no profile.
    pub fn update_profile(
        &self,
        student_id: i64,
        request: &UpdateProfileRequest,
    ) -> SqliteResult<Option<StudentProfile>> {
        let conn = self.conn()?;

        let mut update = PartialUpdate::new("student_profiles").keyed_by("student_id");
        update
            .set_opt("bio", &request.bio)
            .set_opt("goals", &request.goals)
            .set_opt("notification_preferences", &request.notification_preferences)
            .set("last_updated", Utc::now().to_rfc3339());

        let rows = update.execute(&conn, student_id)?;
        drop(conn);

        if rows == 0 {
            return Ok(None);
        }
        self.get_profile(student_id)
    }

    pub fn delete_profile(&self, student_id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows_affected =
            conn.execute("DELETE FROM student_profiles WHERE student_id = ?1", [student_id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateStudentRequest;

    fn seeded() -> (Database, i64) {
        let db = Database::new(":memory:").unwrap();
        let student = db
            .create_student(&CreateStudentRequest {
                name: "Yacine".to_string(),
                email: "yacine@uni.edu".to_string(),
                password: "pw".to_string(),
                field_of_study: None,
                year_level: None,
            })
            .unwrap();
        (db, student.id)
    }

    #[test]
    fn test_profile_lifecycle() {
        let (db, student_id) = seeded();
        assert!(db.get_profile(student_id).unwrap().is_none());

        let created = db
            .create_profile(
                student_id,
                &CreateProfileRequest {
                    bio: Some("Likes robots".to_string()),
                    goals: Some("Win a hackathon".to_string()),
                    notification_preferences: None,
                },
            )
            .unwrap();
        assert_eq!(created.student_id, student_id);

        let updated = db
            .update_profile(
                student_id,
                &UpdateProfileRequest {
                    notification_preferences: Some(Some("weekly".to_string())),
                    goals: Some(None),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Likes robots"));
        assert_eq!(updated.goals, None);
        assert_eq!(updated.notification_preferences.as_deref(), Some("weekly"));
        assert!(updated.last_updated >= created.last_updated);

        assert!(db.delete_profile(student_id).unwrap());
        assert!(!db.delete_profile(student_id).unwrap());
    }

    #[test]
    fn test_second_profile_rejected() {
        let (db, student_id) = seeded();
        db.create_profile(student_id, &CreateProfileRequest::default()).unwrap();
        assert!(db
            .create_profile(student_id, &CreateProfileRequest::default())
            .is_err());
    }

    #[test]
    fn test_update_without_profile_returns_none() {
        let (db, student_id) = seeded();
        assert!(db
            .update_profile(student_id, &UpdateProfileRequest::default())
            .unwrap()
            .is_none());
    }
}
