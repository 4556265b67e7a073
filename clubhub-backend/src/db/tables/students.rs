//! Student database operations (students, student_skills, student_clubs)

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use super::{stored_password_hash, PartialUpdate};
use crate::models::{
    parse_timestamp, Club, CreateStudentRequest, SimilarStudent, Skill, Student,
    UpdateStudentRequest,
};

const STUDENT_COLUMNS: &str =
    "id, name, email, password_hash, field_of_study, year_level, created_at, updated_at";

impl Database {
    // ============================================
    // Students CRUD
    // ============================================

    /// Create a student; the password is hashed before it reaches the table
    pub fn create_student(&self, request: &CreateStudentRequest) -> SqliteResult<Student> {
        let password_hash = stored_password_hash(&request.password)?;
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO students (name, email, password_hash, field_of_study, year_level, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            rusqlite::params![
                request.name,
                request.email,
                password_hash,
                request.field_of_study,
                request.year_level,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        log::info!("Created student {} ({})", id, request.email);
        self.get_student(id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn get_student(&self, id: i64) -> SqliteResult<Option<Student>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS),
            [id],
            Self::row_to_student,
        )
        .optional()
    }

    pub fn get_student_by_email(&self, email: &str) -> SqliteResult<Option<Student>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM students WHERE email = ?1", STUDENT_COLUMNS),
            [email],
            Self::row_to_student,
        )
        .optional()
    }

    pub fn list_students(&self) -> SqliteResult<Vec<Student>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM students ORDER BY id",
            STUDENT_COLUMNS
        ))?;
        let students = stmt
            .query_map([], Self::row_to_student)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(students)
    }

    /// Apply a partial update. Returns `None` if the student does not exist.
    pub fn update_student(
        &self,
        id: i64,
        request: &UpdateStudentRequest,
    ) -> SqliteResult<Option<Student>> {
        let password_hash = request.password.as_deref().map(stored_password_hash).transpose()?;
        let conn = self.conn()?;

        let mut update = PartialUpdate::new("students");
        update
            .set_opt("name", &request.name)
            .set_opt("email", &request.email)
            .set_opt("password_hash", &password_hash)
            .set_opt("field_of_study", &request.field_of_study)
            .set_opt("year_level", &request.year_level)
            .set("updated_at", Utc::now().to_rfc3339());

        let rows = update.execute(&conn, id)?;
        drop(conn);

        if rows == 0 {
            return Ok(None);
        }
        self.get_student(id)
    }

    /// Delete a student; profile, skills, memberships and registrations cascade
    pub fn delete_student(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM students WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    // ============================================
    // student_skills
    // ============================================

    /// Link a skill to a student. Returns false if the link already existed.
    pub fn add_student_skill(&self, student_id: i64, skill_id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "INSERT OR IGNORE INTO student_skills (student_id, skill_id) VALUES (?1, ?2)",
            [student_id, skill_id],
        )?;
        Ok(rows > 0)
    }

    pub fn remove_student_skill(&self, student_id: i64, skill_id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "DELETE FROM student_skills WHERE student_id = ?1 AND skill_id = ?2",
            [student_id, skill_id],
        )?;
        Ok(rows > 0)
    }

    pub fn list_student_skills(&self, student_id: i64) -> SqliteResult<Vec<Skill>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT sk.id, sk.name, sk.category
             FROM skills sk
             JOIN student_skills ss ON ss.skill_id = sk.id
             WHERE ss.student_id = ?1
             ORDER BY sk.name",
        )?;
        let skills = stmt
            .query_map([student_id], Self::row_to_skill)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(skills)
    }

    // ============================================
    // student_clubs
    // ============================================

    /// Add a student to a club. Returns false if already a member.
    pub fn join_club(&self, student_id: i64, club_id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "INSERT OR IGNORE INTO student_clubs (student_id, club_id, joined_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![student_id, club_id, Utc::now().to_rfc3339()],
        )?;
        Ok(rows > 0)
    }

    pub fn leave_club(&self, student_id: i64, club_id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "DELETE FROM student_clubs WHERE student_id = ?1 AND club_id = ?2",
            [student_id, club_id],
        )?;
        Ok(rows > 0)
    }

    pub fn list_student_clubs(&self, student_id: i64) -> SqliteResult<Vec<Club>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.email, c.password_hash, c.description, c.mission, c.history,
                    c.contact_email, c.website, c.logo_url, c.personality_style, c.created_at, c.updated_at
             FROM clubs c
             JOIN student_clubs sc ON sc.club_id = c.id
             WHERE sc.student_id = ?1
             ORDER BY c.name",
        )?;
        let clubs = stmt
            .query_map([student_id], Self::row_to_club)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(clubs)
    }

    // ============================================
    // Similarity (input for recommendations)
    // ============================================

    /// Students who share skills or clubs with `student_id`, best match first.
    ///
    /// Score: 2 per shared skill, 2 per shared club, 1 for the same field of study.
    /// Students with a zero score are not returned.
    pub fn find_similar_students(
        &self,
        student_id: i64,
        limit: usize,
    ) -> SqliteResult<Vec<SimilarStudent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, field_of_study, shared_skills, shared_clubs, score FROM (
                SELECT id, name, field_of_study, shared_skills, shared_clubs,
                       shared_skills * 2 + shared_clubs * 2 + same_field AS score
                FROM (
                    SELECT s.id, s.name, s.field_of_study,
                           (SELECT COUNT(*) FROM student_skills a
                              JOIN student_skills b ON a.skill_id = b.skill_id
                             WHERE a.student_id = ?1 AND b.student_id = s.id) AS shared_skills,
                           (SELECT COUNT(*) FROM student_clubs a
                              JOIN student_clubs b ON a.club_id = b.club_id
                             WHERE a.student_id = ?1 AND b.student_id = s.id) AS shared_clubs,
                           CASE WHEN s.field_of_study IS NOT NULL
                                 AND s.field_of_study = (SELECT field_of_study FROM students WHERE id = ?1)
                                THEN 1 ELSE 0 END AS same_field
                    FROM students s
                    WHERE s.id != ?1
                )
            )
            WHERE score > 0
            ORDER BY score DESC, id ASC
            LIMIT ?2",
        )?;

        let similar = stmt
            .query_map(rusqlite::params![student_id, limit as i64], |row| {
                Ok(SimilarStudent {
                    student_id: row.get(0)?,
                    name: row.get(1)?,
                    field_of_study: row.get(2)?,
                    shared_skills: row.get(3)?,
                    shared_clubs: row.get(4)?,
                    score: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(similar)
    }

    pub(crate) fn row_to_student(row: &rusqlite::Row) -> rusqlite::Result<Student> {
        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;
        Ok(Student {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            field_of_study: row.get(4)?,
            year_level: row.get(5)?,
            created_at: parse_timestamp(6, &created_at)?,
            updated_at: parse_timestamp(7, &updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::models::{CreateClubRequest, CreateSkillRequest};

    fn student_request(name: &str, email: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            field_of_study: Some("Computer Science".to_string()),
            year_level: Some(2),
        }
    }

    fn club_request(name: &str, email: &str) -> CreateClubRequest {
        CreateClubRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "clubpass".to_string(),
            description: None,
            mission: None,
            history: None,
            contact_email: None,
            website: None,
            logo_url: None,
            personality_style: None,
        }
    }

    #[test]
    fn test_create_student_hashes_password() {
        let db = Database::new(":memory:").unwrap();
        let student = db.create_student(&student_request("Amina", "amina@uni.edu")).unwrap();
        assert_ne!(student.password_hash, "password123");
        assert!(verify_password("password123", &student.password_hash));

        let json = serde_json::to_value(&student).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_update_student_leaves_unset_fields() {
        let db = Database::new(":memory:").unwrap();
        let student = db.create_student(&student_request("Amina", "amina@uni.edu")).unwrap();

        let updated = db
            .update_student(
                student.id,
                &UpdateStudentRequest {
                    year_level: Some(Some(3)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.year_level, Some(3));
        assert_eq!(updated.name, "Amina");
        assert_eq!(updated.field_of_study.as_deref(), Some("Computer Science"));
        assert_eq!(updated.password_hash, student.password_hash);
        assert!(updated.updated_at >= student.updated_at);
    }

    #[test]
    fn test_update_student_password_rehashes() {
        let db = Database::new(":memory:").unwrap();
        let student = db.create_student(&student_request("Amina", "amina@uni.edu")).unwrap();
        let updated = db
            .update_student(
                student.id,
                &UpdateStudentRequest {
                    password: Some("new-secret".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(verify_password("new-secret", &updated.password_hash));
        assert!(!verify_password("password123", &updated.password_hash));
    }

    #[test]
    fn test_update_and_delete_missing_student() {
        let db = Database::new(":memory:").unwrap();
        assert!(db
            .update_student(99, &UpdateStudentRequest::default())
            .unwrap()
            .is_none());
        assert!(!db.delete_student(99).unwrap());
    }

    #[test]
    fn test_skill_links() {
        let db = Database::new(":memory:").unwrap();
        let student = db.create_student(&student_request("Amina", "amina@uni.edu")).unwrap();
        let rust = db
            .create_skill(&CreateSkillRequest {
                name: "Rust".to_string(),
                category: Some("programming".to_string()),
            })
            .unwrap();

        assert!(db.add_student_skill(student.id, rust.id).unwrap());
        assert!(!db.add_student_skill(student.id, rust.id).unwrap());
        assert_eq!(db.list_student_skills(student.id).unwrap(), vec![rust.clone()]);

        assert!(db.remove_student_skill(student.id, rust.id).unwrap());
        assert!(db.list_student_skills(student.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_student_cascades_memberships() {
        let db = Database::new(":memory:").unwrap();
        let student = db.create_student(&student_request("Amina", "amina@uni.edu")).unwrap();
        let club = db.create_club(&club_request("Robotics", "robotics@uni.edu")).unwrap();
        assert!(db.join_club(student.id, club.id).unwrap());
        assert_eq!(db.list_club_members(club.id).unwrap().len(), 1);

        assert!(db.delete_student(student.id).unwrap());
        assert!(db.list_club_members(club.id).unwrap().is_empty());
    }

    #[test]
    fn test_find_similar_students_ranks_by_overlap() {
        let db = Database::new(":memory:").unwrap();
        let me = db.create_student(&student_request("Me", "me@uni.edu")).unwrap();
        let close = db.create_student(&student_request("Close", "close@uni.edu")).unwrap();
        let far = db
            .create_student(&CreateStudentRequest {
                field_of_study: Some("History".to_string()),
                ..student_request("Far", "far@uni.edu")
            })
            .unwrap();
        let stranger = db
            .create_student(&CreateStudentRequest {
                field_of_study: None,
                ..student_request("Stranger", "stranger@uni.edu")
            })
            .unwrap();

        let ai = db
            .create_skill(&CreateSkillRequest { name: "AI".to_string(), category: None })
            .unwrap();
        let club = db.create_club(&club_request("AI Club", "ai@uni.edu")).unwrap();

        db.add_student_skill(me.id, ai.id).unwrap();
        db.add_student_skill(close.id, ai.id).unwrap();
        db.join_club(me.id, club.id).unwrap();
        db.join_club(close.id, club.id).unwrap();
        db.join_club(far.id, club.id).unwrap();

        let similar = db.find_similar_students(me.id, 10).unwrap();
        let ids: Vec<i64> = similar.iter().map(|s| s.student_id).collect();
        assert_eq!(ids, vec![close.id, far.id]);
        assert_eq!(similar[0].shared_skills, 1);
        assert_eq!(similar[0].shared_clubs, 1);
        assert_eq!(similar[0].score, 5);
        assert_eq!(similar[1].score, 2);
        assert!(!ids.contains(&stranger.id));
    }
}
