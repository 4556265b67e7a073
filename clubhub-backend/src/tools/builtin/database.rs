//! Read-only database access for agents
//!
//! One tool with an `action` parameter keeps the schema small; every agent
//! gets the same tool and picks the lookups it needs.

use crate::db::tables::events::parse_filter_date;
use crate::db::Database;
use crate::models::EventSearchFilters;
use crate::tools::registry::Tool;
use crate::tools::types::{PropertySchema, ToolContext, ToolDefinition, ToolInputSchema, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

pub const DATABASE_TOOL_NAME: &str = "query_database";

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_TRENDING_LIMIT: usize = 5;
const DEFAULT_SIMILAR_LIMIT: usize = 5;
const MAX_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr, IntoStaticStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatabaseAction {
    GetStudent,
    GetStudentProfile,
    GetClub,
    ListClubs,
    GetClubEvents,
    GetEvent,
    SearchEvents,
    TrendingEvents,
    ListSkills,
    StudentActivity,
    SimilarStudents,
}

#[derive(Debug, Deserialize)]
struct DatabaseParams {
    action: DatabaseAction,
    student_id: Option<i64>,
    club_id: Option<i64>,
    event_id: Option<i64>,
    query: Option<String>,
    event_type: Option<String>,
    location: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    #[serde(default)]
    has_seats: bool,
    limit: Option<usize>,
}

impl DatabaseParams {
    fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }

    fn require(&self, value: Option<i64>, name: &str) -> Result<i64, ToolResult> {
        value.ok_or_else(|| {
            ToolResult::error(format!(
                "Action '{}' requires the '{}' parameter",
                self.action.as_ref(),
                name
            ))
        })
    }

    fn filters(&self) -> Result<EventSearchFilters, ToolResult> {
        let parse = |value: &Option<String>, name: &str| match value {
            None => Ok(None),
            Some(raw) => parse_filter_date(raw).map(Some).ok_or_else(|| {
                ToolResult::error(format!("Invalid {} '{}': use YYYY-MM-DD or RFC 3339", name, raw))
            }),
        };
        Ok(EventSearchFilters {
            event_type: self.event_type.clone(),
            club_id: self.club_id,
            location: self.location.clone(),
            date_from: parse(&self.date_from, "date_from")?,
            date_to: parse(&self.date_to, "date_to")?,
            has_seats: self.has_seats,
        })
    }
}

/// Tool giving agents read access to students, clubs, events and skills
pub struct DatabaseTool {
    definition: ToolDefinition,
}

impl DatabaseTool {
    pub fn new() -> Self {
        let actions: Vec<&'static str> = DatabaseAction::iter().map(<&'static str>::from).collect();

        let mut properties = HashMap::new();
        properties.insert(
            "action".to_string(),
            PropertySchema::new("string", "Which lookup to run").with_enum(&actions),
        );
        properties.insert(
            "student_id".to_string(),
            PropertySchema::new(
                "integer",
                "Student ID (get_student, get_student_profile, student_activity, similar_students)",
            ),
        );
        properties.insert(
            "club_id".to_string(),
            PropertySchema::new("integer", "Club ID (get_club, get_club_events; optional filter for search_events)"),
        );
        properties.insert(
            "event_id".to_string(),
            PropertySchema::new("integer", "Event ID (get_event)"),
        );
        properties.insert(
            "query".to_string(),
            PropertySchema::new("string", "Free-text search terms (search_events)"),
        );
        properties.insert(
            "event_type".to_string(),
            PropertySchema::new("string", "Filter: event type such as workshop, talk, hackathon"),
        );
        properties.insert(
            "location".to_string(),
            PropertySchema::new("string", "Filter: part of the location name"),
        );
        properties.insert(
            "date_from".to_string(),
            PropertySchema::new("string", "Filter: earliest event date (YYYY-MM-DD)"),
        );
        properties.insert(
            "date_to".to_string(),
            PropertySchema::new("string", "Filter: latest event date (YYYY-MM-DD)"),
        );
        properties.insert(
            "has_seats".to_string(),
            PropertySchema::new("boolean", "Filter: only events with open seats"),
        );
        properties.insert(
            "limit".to_string(),
            PropertySchema::new("integer", "Maximum number of results"),
        );

        DatabaseTool {
            definition: ToolDefinition {
                name: DATABASE_TOOL_NAME.to_string(),
                description: "Query the ClubHub database for students, profiles, clubs, events and skills. \
                    Use search_events for topic searches, trending_events for popular upcoming events, \
                    and student_activity / similar_students for personalization."
                    .to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["action".to_string()],
                },
            },
        }
    }

    fn run(db: &Database, params: &DatabaseParams) -> Result<ToolResult, ToolResult> {
        let db_err = |e: rusqlite::Error| {
            log::error!("query_database {} failed: {}", params.action.as_ref(), e);
            ToolResult::error(format!("Database error: {}", e))
        };

        let result = match params.action {
            DatabaseAction::GetStudent => {
                let id = params.require(params.student_id, "student_id")?;
                let student = db
                    .get_student(id)
                    .map_err(db_err)?
                    .ok_or_else(|| ToolResult::error(format!("Student {} not found", id)))?;
                let skills = db.list_student_skills(id).map_err(db_err)?;
                let clubs = db.list_student_clubs(id).map_err(db_err)?;
                ToolResult::json(&json!({
                    "student": student,
                    "skills": skills,
                    "clubs": clubs.iter().map(|c| json!({"id": c.id, "name": c.name})).collect::<Vec<_>>(),
                }))
            }
            DatabaseAction::GetStudentProfile => {
                let id = params.require(params.student_id, "student_id")?;
                let profile = db
                    .get_profile(id)
                    .map_err(db_err)?
                    .ok_or_else(|| ToolResult::error(format!("Student {} has no profile", id)))?;
                ToolResult::json(&profile)
            }
            DatabaseAction::GetClub => {
                let id = params.require(params.club_id, "club_id")?;
                let club = db
                    .get_club(id)
                    .map_err(db_err)?
                    .ok_or_else(|| ToolResult::error(format!("Club {} not found", id)))?;
                let events = db.list_club_events(id).map_err(db_err)?;
                let members = db.list_club_members(id).map_err(db_err)?;
                ToolResult::json(&json!({
                    "club": club,
                    "events": events,
                    "member_count": members.len(),
                }))
            }
            DatabaseAction::ListClubs => {
                let clubs = db.list_clubs().map_err(db_err)?;
                let rows: Vec<Value> = clubs
                    .iter()
                    .map(|c| json!({"id": c.id, "name": c.name, "description": c.description}))
                    .collect();
                ToolResult::json(&rows)
            }
            DatabaseAction::GetClubEvents => {
                let id = params.require(params.club_id, "club_id")?;
                if db.get_club(id).map_err(db_err)?.is_none() {
                    return Err(ToolResult::error(format!("Club {} not found", id)));
                }
                ToolResult::json(&db.list_club_events(id).map_err(db_err)?)
            }
            DatabaseAction::GetEvent => {
                let id = params.require(params.event_id, "event_id")?;
                let event = db
                    .get_event(id)
                    .map_err(db_err)?
                    .ok_or_else(|| ToolResult::error(format!("Event {} not found", id)))?;
                ToolResult::json(&event)
            }
            DatabaseAction::SearchEvents => {
                let filters = params.filters()?;
                let query = params.query.as_deref().unwrap_or("");
                let results = db
                    .search_events(query, &filters, params.limit_or(DEFAULT_SEARCH_LIMIT))
                    .map_err(db_err)?;
                ToolResult::json(&results)
            }
            DatabaseAction::TrendingEvents => {
                let events = db
                    .trending_events(params.limit_or(DEFAULT_TRENDING_LIMIT))
                    .map_err(db_err)?;
                ToolResult::json(&events)
            }
            DatabaseAction::ListSkills => ToolResult::json(&db.list_skills().map_err(db_err)?),
            DatabaseAction::StudentActivity => {
                let id = params.require(params.student_id, "student_id")?;
                if db.get_student(id).map_err(db_err)?.is_none() {
                    return Err(ToolResult::error(format!("Student {} not found", id)));
                }
                let clubs = db.list_student_clubs(id).map_err(db_err)?;
                let events = db.list_student_events(id).map_err(db_err)?;
                let skills = db.list_student_skills(id).map_err(db_err)?;
                ToolResult::json(&json!({
                    "clubs": clubs.iter().map(|c| json!({"id": c.id, "name": c.name})).collect::<Vec<_>>(),
                    "registered_events": events,
                    "skills": skills,
                }))
            }
            DatabaseAction::SimilarStudents => {
                let id = params.require(params.student_id, "student_id")?;
                let similar = db
                    .find_similar_students(id, params.limit_or(DEFAULT_SIMILAR_LIMIT))
                    .map_err(db_err)?;
                ToolResult::json(&similar)
            }
        };

        Ok(result)
    }
}

impl Default for DatabaseTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DatabaseTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: DatabaseParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        log::debug!("query_database action={}", params.action.as_ref());
        match Self::run(&context.db, &params) {
            Ok(result) | Err(result) => result,
        }
    }
}
