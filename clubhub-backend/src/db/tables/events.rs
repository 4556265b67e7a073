//! Event database operations (events, event_registrations)

use chrono::{DateTime, Utc};
use regex::Regex;
use rusqlite::{OptionalExtension, Result as SqliteResult, ToSql};

use super::super::Database;
use super::PartialUpdate;
use crate::models::{
    parse_optional_timestamp, parse_timestamp, CreateEventRequest, Event, EventSearchFilters,
    EventSummary, EventUpdateOutcome, RankedEvent, RegistrationOutcome, TrendingEvent, UpdateEventRequest, Urgency,
};

const EVENT_COLUMNS: &str = "id, club_id, title, description, event_type, location, date, deadline, \
     max_seats, current_registrations, view_count, is_trending, created_at, updated_at";

/// Words that carry no meaning in an event search
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "about", "for", "find", "i", "in", "is", "me", "my", "of",
    "on", "or", "show", "some", "the", "to", "want", "what", "with", "events", "event",
];

/// Query words and the extra terms they should also match
const SYNONYMS: &[(&str, &[&str])] = &[
    ("coding", &["programming", "code", "developer"]),
    ("programming", &["coding", "code"]),
    ("ai", &["artificial intelligence", "machine learning", "ml"]),
    ("ml", &["machine learning", "ai"]),
    ("hackathon", &["hackathons", "competition"]),
    ("hackathons", &["hackathon", "competition"]),
    ("workshop", &["workshops", "hands-on", "training"]),
    ("talk", &["talks", "conference", "seminar"]),
    ("robots", &["robotics", "robot"]),
    ("robotics", &["robot", "robots"]),
    ("music", &["concert", "band"]),
    ("sport", &["sports", "tournament"]),
];

impl Database {
    // ============================================
    // Events CRUD
    // ============================================

    /// Insert an event. The caller has already checked that the club exists.
    pub fn create_event(&self, request: &CreateEventRequest) -> SqliteResult<Event> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO events (club_id, title, description, event_type, location, date, deadline,
                                 max_seats, is_trending, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            rusqlite::params![
                request.club_id,
                request.title,
                request.description,
                request.event_type,
                request.location,
                request.date.map(|d| d.to_rfc3339()),
                request.deadline.map(|d| d.to_rfc3339()),
                request.max_seats,
                request.is_trending,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        log::info!("Created event {} for club {}", id, request.club_id);
        self.get_event(id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    pub fn get_event(&self, id: i64) -> SqliteResult<Option<Event>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
            [id],
            Self::row_to_event,
        )
        .optional()
    }

    /// Fetch an event for display, counting the view
    pub fn get_event_and_record_view(&self, id: i64) -> SqliteResult<Option<Event>> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE events SET view_count = view_count + 1 WHERE id = ?1",
            [id],
        )?;
        drop(conn);

        if rows == 0 {
            return Ok(None);
        }
        self.get_event(id)
    }

    pub fn list_event_summaries(&self) -> SqliteResult<Vec<EventSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, club_id, event_type, date, location, current_registrations
             FROM events ORDER BY id",
        )?;
        let events = stmt
            .query_map([], Self::row_to_event_summary)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }

    pub fn list_club_events(&self, club_id: i64) -> SqliteResult<Vec<EventSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, club_id, event_type, date, location, current_registrations
             FROM events WHERE club_id = ?1 ORDER BY date, id",
        )?;
        let events = stmt
            .query_map([club_id], Self::row_to_event_summary)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }

    /// Apply a partial update. A new `max_seats` only applies when it still
    /// covers the registrations already taken.
    pub fn update_event(&self, id: i64, request: &UpdateEventRequest) -> SqliteResult<EventUpdateOutcome> {
        let conn = self.conn()?;

        let mut update = PartialUpdate::new("events");
        update
            .set_opt("title", &request.title)
            .set_opt("description", &request.description)
            .set_opt("event_type", &request.event_type)
            .set_opt("location", &request.location)
            .set_opt("date", &request.date.map(|d| d.map(|d| d.to_rfc3339())))
            .set_opt("deadline", &request.deadline.map(|d| d.map(|d| d.to_rfc3339())))
            .set_opt("max_seats", &request.max_seats)
            .set_opt("is_trending", &request.is_trending)
            .set("updated_at", Utc::now().to_rfc3339());
        if let Some(max_seats) = request.max_seats {
            update.require("{} IS NULL OR {} >= current_registrations", max_seats);
        }

        let rows = update.execute(&conn, id)?;
        drop(conn);

        let Some(event) = self.get_event(id)? else {
            return Ok(EventUpdateOutcome::NotFound);
        };
        if rows == 0 {
            return Ok(EventUpdateOutcome::SeatsBelowRegistrations {
                current_registrations: event.current_registrations,
            });
        }
        Ok(EventUpdateOutcome::Updated(event))
    }

    pub fn delete_event(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    // ============================================
    // Registrations
    // ============================================

    /// Register a student for an event, enforcing the seat limit atomically
    pub fn register_for_event(&self, event_id: i64, student_id: i64) -> SqliteResult<RegistrationOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let seats: Option<(Option<i64>, i64)> = tx
            .query_row(
                "SELECT max_seats, current_registrations FROM events WHERE id = ?1",
                [event_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((max_seats, current)) = seats else {
            return Ok(RegistrationOutcome::EventNotFound);
        };

        let student_exists: bool = tx
            .query_row("SELECT 1 FROM students WHERE id = ?1", [student_id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if !student_exists {
            return Ok(RegistrationOutcome::StudentNotFound);
        }

        let already: bool = tx
            .query_row(
                "SELECT 1 FROM event_registrations WHERE student_id = ?1 AND event_id = ?2",
                [student_id, event_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if already {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        if max_seats.is_some_and(|max| current >= max) {
            return Ok(RegistrationOutcome::EventFull);
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO event_registrations (student_id, event_id, registered_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![student_id, event_id, now],
        )?;
        tx.execute(
            "UPDATE events SET current_registrations = current_registrations + 1, updated_at = ?1 WHERE id = ?2",
            rusqlite::params![now, event_id],
        )?;
        tx.commit()?;
        drop(conn);

        log::info!("Student {} registered for event {}", student_id, event_id);
        match self.get_event(event_id)? {
            Some(event) => Ok(RegistrationOutcome::Registered(event)),
            None => Ok(RegistrationOutcome::EventNotFound),
        }
    }

    /// Events a student registered for, most recent registration first
    pub fn list_student_events(&self, student_id: i64) -> SqliteResult<Vec<Event>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT e.id, e.club_id, e.title, e.description, e.event_type, e.location, e.date, e.deadline,
                    e.max_seats, e.current_registrations, e.view_count, e.is_trending, e.created_at, e.updated_at
             FROM events e
             JOIN event_registrations r ON r.event_id = e.id
             WHERE r.student_id = ?1
             ORDER BY r.registered_at DESC",
        )?;
        let events = stmt
            .query_map([student_id], Self::row_to_event)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }

    // ============================================
    // Discovery (backs the search and recommendation agents)
    // ============================================

    /// Free-text event search with structured filters.
    ///
    /// Filters are applied in SQL; the remaining rows are scored per query term
    /// (title 3, event type 2, description or location 1) with synonyms expanded.
    /// An empty query returns every filtered event ordered by date.
    pub fn search_events(
        &self,
        query: &str,
        filters: &EventSearchFilters,
        limit: usize,
    ) -> SqliteResult<Vec<RankedEvent>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref event_type) = filters.event_type {
            params.push(Box::new(event_type.to_lowercase()));
            clauses.push(format!("LOWER(event_type) = ?{}", params.len()));
        }
        if let Some(club_id) = filters.club_id {
            params.push(Box::new(club_id));
            clauses.push(format!("club_id = ?{}", params.len()));
        }
        if let Some(ref location) = filters.location {
            params.push(Box::new(format!("%{}%", location.to_lowercase())));
            clauses.push(format!("LOWER(location) LIKE ?{}", params.len()));
        }
        if let Some(from) = filters.date_from {
            params.push(Box::new(from.to_rfc3339()));
            clauses.push(format!("date >= ?{}", params.len()));
        }
        if let Some(to) = filters.date_to {
            params.push(Box::new(to.to_rfc3339()));
            clauses.push(format!("date <= ?{}", params.len()));
        }
        if filters.has_seats {
            clauses.push("(max_seats IS NULL OR current_registrations < max_seats)".to_string());
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM events{} ORDER BY date, id",
            EVENT_COLUMNS, where_sql
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let candidates = stmt
            .query_map(params_ref.as_slice(), Self::row_to_event)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let patterns: Vec<Regex> = search_terms(query).iter().filter_map(|g| term_pattern(g)).collect();
        let mut ranked: Vec<RankedEvent> = candidates
            .into_iter()
            .map(|event| {
                let relevance = relevance(&event, &patterns);
                RankedEvent { event, relevance }
            })
            .filter(|r| patterns.is_empty() || r.relevance > 0)
            .collect();

        // Stable sort keeps date order among equal scores
        ranked.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Upcoming events ranked by trending flag, how full they are, and views
    pub fn trending_events(&self, limit: usize) -> SqliteResult<Vec<TrendingEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM events WHERE date IS NULL OR date >= ?1",
            EVENT_COLUMNS
        ))?;
        let events = stmt
            .query_map([Utc::now().to_rfc3339()], Self::row_to_event)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut scored: Vec<(f64, TrendingEvent)> = events
            .into_iter()
            .map(|event| {
                let fill = fill_ratio(&event);
                let score = if event.is_trending { 100.0 } else { 0.0 }
                    + fill * 50.0
                    + (event.view_count.min(1000) as f64) / 10.0
                    + event.current_registrations as f64;
                let urgency = urgency(&event, fill);
                let seats_remaining = event.seats_remaining();
                (
                    score,
                    TrendingEvent {
                        event,
                        seats_remaining,
                        urgency,
                    },
                )
            })
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.event.id.cmp(&b.1.event.id)));
        Ok(scored.into_iter().take(limit).map(|(_, t)| t).collect())
    }

    pub(crate) fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
        let created_at: String = row.get(12)?;
        let updated_at: String = row.get(13)?;
        Ok(Event {
            id: row.get(0)?,
            club_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            event_type: row.get(4)?,
            location: row.get(5)?,
            date: parse_optional_timestamp(6, row.get(6)?)?,
            deadline: parse_optional_timestamp(7, row.get(7)?)?,
            max_seats: row.get(8)?,
            current_registrations: row.get(9)?,
            view_count: row.get(10)?,
            is_trending: row.get::<_, i32>(11)? != 0,
            created_at: parse_timestamp(12, &created_at)?,
            updated_at: parse_timestamp(13, &updated_at)?,
        })
    }

    fn row_to_event_summary(row: &rusqlite::Row) -> rusqlite::Result<EventSummary> {
        Ok(EventSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            club_id: row.get(2)?,
            event_type: row.get(3)?,
            date: parse_optional_timestamp(4, row.get(4)?)?,
            location: row.get(5)?,
            current_registrations: row.get(6)?,
        })
    }
}

/// Lowercased query terms without stopwords, each with its synonym group
fn search_terms(query: &str) -> Vec<Vec<String>> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| w.len() > 1 || *w == "c")
        .filter(|w| !STOPWORDS.contains(w))
        .map(|w| {
            let mut group = vec![w.to_string()];
            if let Some((_, extra)) = SYNONYMS.iter().find(|(k, _)| *k == w) {
                group.extend(extra.iter().map(|s| s.to_string()));
            }
            group
        })
        .collect()
}

/// Whole-word, case-insensitive matcher for one synonym group; a trailing
/// plural `s` is allowed so "workshop" also matches "workshops"
fn term_pattern(group: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = group.iter().map(|t| regex::escape(t)).collect();
    let pattern = format!(r"(?i)\b(?:{})s?\b", alternatives.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Skipping search term {:?}: {}", group, e);
            None
        }
    }
}

fn relevance(event: &Event, patterns: &[Regex]) -> i64 {
    let title = event.title.as_str();
    let event_type = event.event_type.as_deref().unwrap_or("");
    let description = event.description.as_deref().unwrap_or("");
    let location = event.location.as_deref().unwrap_or("");

    patterns
        .iter()
        .map(|pattern| {
            let hit = |field: &str| pattern.is_match(field);
            let mut score = 0;
            if hit(&title) {
                score += 3;
            }
            if hit(&event_type) {
                score += 2;
            }
            if hit(&description) || hit(&location) {
                score += 1;
            }
            score
        })
        .sum()
}

fn fill_ratio(event: &Event) -> f64 {
    match event.max_seats {
        Some(max) if max > 0 => (event.current_registrations as f64 / max as f64).min(1.0),
        _ => 0.0,
    }
}

fn urgency(event: &Event, fill: f64) -> Urgency {
    match event.seats_remaining() {
        Some(left) if left <= 5 || fill >= 0.9 => Urgency::AlmostFull,
        Some(_) if fill >= 0.6 => Urgency::FillingFast,
        _ => Urgency::Popular,
    }
}

/// Parse a date string the way API clients commonly send it: RFC 3339 or a bare date
pub fn parse_filter_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateClubRequest, CreateStudentRequest};
    use chrono::Duration;

    fn seeded() -> (Database, i64) {
        let db = Database::new(":memory:").unwrap();
        let club = db
            .create_club(&CreateClubRequest {
                name: "Tech Club".to_string(),
                email: "tech@uni.edu".to_string(),
                password: "pw".to_string(),
                description: None,
                mission: None,
                history: None,
                contact_email: None,
                website: None,
                logo_url: None,
                personality_style: None,
            })
            .unwrap();
        (db, club.id)
    }

    fn event(club_id: i64, title: &str, event_type: &str, max_seats: Option<i64>) -> CreateEventRequest {
        CreateEventRequest {
            club_id,
            title: title.to_string(),
            description: None,
            event_type: Some(event_type.to_string()),
            location: Some("Main Hall".to_string()),
            date: Some(Utc::now() + Duration::days(7)),
            deadline: None,
            max_seats,
            is_trending: false,
        }
    }

    fn student(db: &Database, email: &str) -> i64 {
        db.create_student(&CreateStudentRequest {
            name: email.to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            field_of_study: None,
            year_level: None,
        })
        .unwrap()
        .id
    }

    #[test]
    fn test_create_event_for_missing_club_fails() {
        let (db, club_id) = seeded();
        assert!(db.create_event(&event(club_id + 100, "Ghost", "talk", None)).is_err());
    }

    #[test]
    fn test_view_count_increments() {
        let (db, club_id) = seeded();
        let created = db.create_event(&event(club_id, "Rust 101", "workshop", None)).unwrap();
        assert_eq!(created.view_count, 0);

        db.get_event_and_record_view(created.id).unwrap().unwrap();
        let seen = db.get_event_and_record_view(created.id).unwrap().unwrap();
        assert_eq!(seen.view_count, 2);
        assert!(db.get_event_and_record_view(999).unwrap().is_none());
    }

    #[test]
    fn test_update_event_keeps_unset_fields() {
        let (db, club_id) = seeded();
        let created = db.create_event(&event(club_id, "Rust 101", "workshop", Some(30))).unwrap();
        let update = UpdateEventRequest {
            location: Some(Some("Room 12".to_string())),
            deadline: Some(None),
            ..Default::default()
        };
        let EventUpdateOutcome::Updated(updated) = db.update_event(created.id, &update).unwrap() else {
            panic!("update should apply");
        };
        assert_eq!(updated.location.as_deref(), Some("Room 12"));
        assert_eq!(updated.title, "Rust 101");
        assert_eq!(updated.max_seats, Some(30));
        assert_eq!(updated.date, created.date);
        assert!(updated.deadline.is_none());

        assert!(matches!(
            db.update_event(999, &update).unwrap(),
            EventUpdateOutcome::NotFound
        ));
    }

    #[test]
    fn test_seat_limit_cannot_drop_below_registrations() {
        let (db, club_id) = seeded();
        let created = db.create_event(&event(club_id, "Robot build", "workshop", Some(5))).unwrap();
        for email in ["a@uni.edu", "b@uni.edu", "c@uni.edu"] {
            let s = student(&db, email);
            db.register_for_event(created.id, s).unwrap();
        }

        let shrink = |max_seats: Option<i64>| UpdateEventRequest {
            max_seats: Some(max_seats),
            title: Some("Robot build night".to_string()),
            ..Default::default()
        };

        match db.update_event(created.id, &shrink(Some(1))).unwrap() {
            EventUpdateOutcome::SeatsBelowRegistrations { current_registrations } => {
                assert_eq!(current_registrations, 3)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let unchanged = db.get_event(created.id).unwrap().unwrap();
        assert_eq!(unchanged.max_seats, Some(5));
        assert_eq!(unchanged.title, "Robot build");

        assert!(matches!(
            db.update_event(created.id, &shrink(Some(3))).unwrap(),
            EventUpdateOutcome::Updated(ref e) if e.max_seats == Some(3)
        ));
        assert!(matches!(
            db.update_event(created.id, &shrink(None)).unwrap(),
            EventUpdateOutcome::Updated(ref e) if e.max_seats.is_none()
        ));
    }

    #[test]
    fn test_registration_respects_seat_limit() {
        let (db, club_id) = seeded();
        let created = db.create_event(&event(club_id, "Tiny meetup", "talk", Some(1))).unwrap();
        let first = student(&db, "a@uni.edu");
        let second = student(&db, "b@uni.edu");

        match db.register_for_event(created.id, first).unwrap() {
            RegistrationOutcome::Registered(e) => assert_eq!(e.current_registrations, 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(matches!(
            db.register_for_event(created.id, first).unwrap(),
            RegistrationOutcome::AlreadyRegistered
        ));
        assert!(matches!(
            db.register_for_event(created.id, second).unwrap(),
            RegistrationOutcome::EventFull
        ));
        assert!(matches!(
            db.register_for_event(999, second).unwrap(),
            RegistrationOutcome::EventNotFound
        ));
        assert!(matches!(
            db.register_for_event(created.id, 999).unwrap(),
            RegistrationOutcome::StudentNotFound
        ));

        let events = db.list_student_events(first).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, created.id);
    }

    #[test]
    fn test_search_uses_synonyms_and_ranks_title_first() {
        let (db, club_id) = seeded();
        db.create_event(&event(club_id, "Intro to Programming", "workshop", None)).unwrap();
        db.create_event(&CreateEventRequest {
            description: Some("Bring your laptop, some programming required".to_string()),
            ..event(club_id, "Game Night", "social", None)
        })
        .unwrap();
        db.create_event(&event(club_id, "Poetry Slam", "arts", None)).unwrap();

        let results = db
            .search_events("coding events", &EventSearchFilters::default(), 10)
            .unwrap();
        let titles: Vec<&str> = results.iter().map(|r| r.event.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro to Programming", "Game Night"]);
        assert!(results[0].relevance > results[1].relevance);
    }

    #[test]
    fn test_search_filters_apply_without_query() {
        let (db, club_id) = seeded();
        db.create_event(&event(club_id, "AI Workshop", "workshop", Some(2))).unwrap();
        db.create_event(&event(club_id, "AI Talk", "talk", None)).unwrap();

        let filters = EventSearchFilters {
            event_type: Some("Workshop".to_string()),
            ..Default::default()
        };
        let results = db.search_events("", &filters, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].event.title, "AI Workshop");

        let past = EventSearchFilters {
            date_to: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        };
        assert!(db.search_events("ai", &past, 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_matches_whole_words_only() {
        let (db, club_id) = seeded();
        db.create_event(&event(club_id, "Poetry Slam", "arts", None)).unwrap();
        db.create_event(&CreateEventRequest {
            description: Some("Team training session".to_string()),
            ..event(club_id, "Basketball", "sport", None)
        })
        .unwrap();
        db.create_event(&event(club_id, "AI Ethics Panel", "talk", None)).unwrap();

        let results = db.search_events("AI", &EventSearchFilters::default(), 10).unwrap();
        let titles: Vec<&str> = results.iter().map(|r| r.event.title.as_str()).collect();
        assert_eq!(titles, vec!["AI Ethics Panel"]);

        // A trailing plural `s` in the field still matches
        let results = db.search_events("ethic", &EventSearchFilters::default(), 10).unwrap();
        assert_eq!(results.len(), 1);
        assert!(db.search_events("eth", &EventSearchFilters::default(), 10).unwrap().is_empty());
    }

    #[test]
    fn test_trending_prefers_flagged_and_full_events() {
        let (db, club_id) = seeded();
        let quiet = db.create_event(&event(club_id, "Quiet", "talk", Some(100))).unwrap();
        let flagged = db
            .create_event(&CreateEventRequest {
                is_trending: true,
                ..event(club_id, "Hackathon", "hackathon", Some(50))
            })
            .unwrap();
        let small = db.create_event(&event(club_id, "Small", "workshop", Some(2))).unwrap();
        let s = student(&db, "c@uni.edu");
        db.register_for_event(small.id, s).unwrap();

        let trending = db.trending_events(10).unwrap();
        let ids: Vec<i64> = trending.iter().map(|t| t.event.id).collect();
        assert_eq!(ids, vec![flagged.id, small.id]);
        assert!(!ids.contains(&quiet.id));
        assert_eq!(trending[1].seats_remaining, Some(1));
        assert_eq!(trending[1].urgency, Urgency::AlmostFull);
    }

    #[test]
    fn test_search_terms_drop_stopwords() {
        let terms = search_terms("Show me AI events");
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0][0], "ai");
        assert!(terms[0].contains(&"machine learning".to_string()));
    }

    #[test]
    fn test_parse_filter_date() {
        assert!(parse_filter_date("2026-03-01").is_some());
        assert!(parse_filter_date("2026-03-01T10:00:00Z").is_some());
        assert!(parse_filter_date("next week").is_none());
    }
}
