pub mod club;
pub mod event;
pub mod session;
pub mod skill;
pub mod student;

pub use club::{Club, ClubMember, CreateClubRequest, UpdateClubRequest};
pub use event::{
    CreateEventRequest, Event, EventSearchFilters, EventUpdateOutcome, EventSummary, RankedEvent,
    RegisterForEventRequest, RegistrationOutcome, TrendingEvent, UpdateEventRequest, Urgency,
};
pub use session::{AccountType, Session};
pub use skill::{CreateSkillRequest, Skill, UpdateSkillRequest};
pub use student::{
    CreateProfileRequest, CreateStudentRequest, SimilarStudent, Student, StudentProfile,
    UpdateProfileRequest, UpdateStudentRequest,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// `deserialize_with` for nullable columns in partial updates: a missing field
/// stays `None` (via `#[serde(default)]`), an explicit `null` becomes
/// `Some(None)` and clears the column.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body returned by every successful DELETE endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl DeleteResponse {
    pub fn deleted(entity: &str) -> Self {
        Self {
            success: true,
            message: format!("{} deleted successfully", entity),
            timestamp: Utc::now(),
        }
    }
}

/// Parse an RFC 3339 column; anything else is a conversion error on column `idx`.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

pub(crate) fn parse_optional_timestamp(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_timestamp(idx, &v)).transpose()
}
