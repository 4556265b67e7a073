use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event hosted by a club
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub club_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub max_seats: Option<i64>,
    pub current_registrations: i64,
    pub view_count: i64,
    pub is_trending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Seats still open, or `None` when the event has no seat limit
    pub fn seats_remaining(&self) -> Option<i64> {
        self.max_seats
            .map(|max| (max - self.current_registrations).max(0))
    }
}

/// Lightweight row used by the list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub club_id: i64,
    pub event_type: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub current_registrations: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub club_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub max_seats: Option<i64>,
    #[serde(default)]
    pub is_trending: bool,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub event_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub max_seats: Option<Option<i64>>,
    pub is_trending: Option<bool>,
}

/// Structured filters accepted by event search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSearchFilters {
    pub event_type: Option<String>,
    pub club_id: Option<i64>,
    pub location: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Only events that still have open seats (or no seat limit)
    #[serde(default)]
    pub has_seats: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForEventRequest {
    pub student_id: i64,
}

/// Event matched by a free-text search, with its relevance score
#[derive(Debug, Clone, Serialize)]
pub struct RankedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub relevance: i64,
}

/// Event ranked by registration momentum and views
#[derive(Debug, Clone, Serialize)]
pub struct TrendingEvent {
    #[serde(flatten)]
    pub event: Event,
    pub seats_remaining: Option<i64>,
    pub urgency: Urgency,
}

/// How quickly a student should act on a trending event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    AlmostFull,
    FillingFast,
    Popular,
}

/// Result of trying to register a student for an event
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    Registered(Event),
    EventNotFound,
    StudentNotFound,
    AlreadyRegistered,
    EventFull,
}

/// Result of a partial event update
#[derive(Debug, Clone)]
pub enum EventUpdateOutcome {
    Updated(Event),
    NotFound,
    /// The new seat limit is below the registrations already taken
    SeatsBelowRegistrations { current_registrations: i64 },
}
