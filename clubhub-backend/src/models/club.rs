use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student club
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub description: Option<String>,
    pub mission: Option<String>,
    pub history: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    /// Tone the club chatbot should adopt when answering for this club
    pub personality_style: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a new club account
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub description: Option<String>,
    pub mission: Option<String>,
    pub history: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub personality_style: Option<String>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClubRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub mission: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub history: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub personality_style: Option<Option<String>>,
}

/// A student listed as a club member
#[derive(Debug, Clone, Serialize)]
pub struct ClubMember {
    pub student_id: i64,
    pub name: String,
    pub field_of_study: Option<String>,
    pub joined_at: DateTime<Utc>,
}
