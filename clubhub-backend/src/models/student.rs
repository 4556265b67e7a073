use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub field_of_study: Option<String>,
    pub year_level: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a new student
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub field_of_study: Option<String>,
    pub year_level: Option<i32>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub field_of_study: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub year_level: Option<Option<i32>>,
}

/// Free-form profile attached to a student (at most one per student)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: i64,
    pub student_id: i64,
    pub bio: Option<String>,
    pub goals: Option<String>,
    pub notification_preferences: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProfileRequest {
    pub bio: Option<String>,
    pub goals: Option<String>,
    pub notification_preferences: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub goals: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub notification_preferences: Option<Option<String>>,
}

/// Another student ranked by overlap in skills and club memberships
#[derive(Debug, Clone, Serialize)]
pub struct SimilarStudent {
    pub student_id: i64,
    pub name: String,
    pub field_of_study: Option<String>,
    pub shared_skills: i64,
    pub shared_clubs: i64,
    pub score: i64,
}
