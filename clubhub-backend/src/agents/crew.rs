//! The crew: master orchestrator plus specialist agents over one AI client

use super::definitions::AgentKind;
use super::memory::ConversationMemory;
use super::routing::RoutingDecision;
use super::runner::AgentRunner;
use super::tasks::AgentTask;
use crate::ai::{AiClient, AiError};
use crate::config::Config;
use crate::db::Database;
use crate::models::{Club, EventSearchFilters};
use crate::tools::{ToolContext, ToolRegistry};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const SEARCH_CANDIDATES: usize = 10;
const TRENDING_CANDIDATES: usize = 10;

/// Answer produced by one of the agents
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub response: String,
    pub agent: AgentKind,
}

#[derive(Debug)]
pub enum CrewError {
    /// A referenced student or club does not exist
    NotFound(String),
    Database(rusqlite::Error),
    Ai(AiError),
}

impl fmt::Display for CrewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewError::NotFound(what) => write!(f, "{}", what),
            CrewError::Database(e) => write!(f, "Database error: {}", e),
            CrewError::Ai(e) => write!(f, "AI error: {}", e),
        }
    }
}

impl std::error::Error for CrewError {}

impl From<rusqlite::Error> for CrewError {
    fn from(e: rusqlite::Error) -> Self {
        CrewError::Database(e)
    }
}

impl From<AiError> for CrewError {
    fn from(e: AiError) -> Self {
        CrewError::Ai(e)
    }
}

pub struct Crew {
    db: Arc<Database>,
    runner: AgentRunner,
    memory: ConversationMemory,
}

impl Crew {
    pub fn new(db: Arc<Database>, ai: Arc<AiClient>, tools: Arc<ToolRegistry>, config: &Config) -> Self {
        let runner = AgentRunner::new(
            ai,
            tools,
            ToolContext::new(db.clone()),
            config.agent_max_iterations,
        );
        Self {
            db,
            runner,
            memory: ConversationMemory::with_limits(
                config.agent_memory_turns,
                Duration::from_secs(config.agent_memory_idle_minutes.saturating_mul(60)),
                config.agent_memory_max_sessions,
            ),
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    // ============================================
    // Master orchestrator
    // ============================================

    /// Route a free-text query through the master orchestrator to a specialist.
    ///
    /// When the routing answer names no recognizable agent, or names the
    /// master itself, the master answers directly. `context` may carry a
    /// `session_id` (or `student_id`) that keys conversation memory.
    pub async fn process_student_query(
        &self,
        query: &str,
        context: Option<&Value>,
    ) -> Result<AgentReply, CrewError> {
        let session = session_key(context);
        let history = match session.as_deref() {
            Some(key) => self.load_history(key).await,
            None => Vec::new(),
        };

        let routing_text = self
            .runner
            .run(&AgentTask::routing(query, context), &history)
            .await?;

        let reply = match RoutingDecision::parse(&routing_text) {
            Some(decision) if decision.agent != AgentKind::MasterOrchestrator => {
                log::info!(
                    "[CREW] Routing to {} ({})",
                    decision.agent.display_name(),
                    decision.reason
                );
                let task = AgentTask::delegated(decision.agent, query, &decision.context, context);
                AgentReply {
                    response: self.runner.run(&task, &history).await?,
                    agent: decision.agent,
                }
            }
            decision => {
                if decision.is_none() {
                    log::warn!("[CREW] Unparseable routing decision, master answers directly: {}", routing_text);
                }
                let task = AgentTask::direct_answer(query, context);
                AgentReply {
                    response: self.runner.run(&task, &history).await?,
                    agent: AgentKind::MasterOrchestrator,
                }
            }
        };

        if let Some(key) = session.as_deref() {
            self.memory.record(key, query, &reply.response);
        }
        Ok(reply)
    }

    /// History for a session, condensed by the master first when it is full
    async fn load_history(&self, session: &str) -> Vec<crate::ai::Message> {
        if self.memory.is_full(session) {
            let history = self.memory.history(session);
            match self
                .runner
                .run(&AgentTask::context_management(&history), &[])
                .await
            {
                Ok(summary) => self.memory.replace_with_summary(session, &summary),
                Err(e) => log::warn!("[CREW] Failed to condense session {}: {}", session, e),
            }
        }
        self.memory.history(session)
    }

    // ============================================
    // Club chatbot
    // ============================================

    pub async fn handle_club_query(&self, club_id: i64, question: &str) -> Result<AgentReply, CrewError> {
        let club = self.require_club(club_id)?;
        self.run_task(AgentTask::club_info(&club, question)).await
    }

    pub async fn handle_application_help(&self, club_id: i64, student_id: i64) -> Result<AgentReply, CrewError> {
        let club = self.require_club(club_id)?;
        self.require_student(student_id)?;
        self.run_task(AgentTask::application_help(&club, student_id)).await
    }

    // ============================================
    // Recommendation agent
    // ============================================

    pub async fn handle_recommendation_request(&self, student_id: i64) -> Result<AgentReply, CrewError> {
        self.require_student(student_id)?;
        self.run_task(AgentTask::personalized_recommendations(student_id)).await
    }

    pub async fn handle_weekly_digest(&self, student_id: i64) -> Result<AgentReply, CrewError> {
        self.require_student(student_id)?;
        self.run_task(AgentTask::weekly_digest(student_id)).await
    }

    // ============================================
    // Search agent
    // ============================================

    /// Natural-language event search. Matches from the event index are handed
    /// to the agent up front so most searches finish in one model call.
    pub async fn handle_search_query(&self, query: &str, filters: Option<&Value>) -> Result<AgentReply, CrewError> {
        let parsed = match filters {
            Some(value) if !value.is_null() => serde_json::from_value::<EventSearchFilters>(value.clone())
                .unwrap_or_else(|e| {
                    log::warn!("[CREW] Ignoring search filters the index cannot apply: {}", e);
                    EventSearchFilters::default()
                }),
            _ => EventSearchFilters::default(),
        };
        let matches = self.db.search_events(query, &parsed, SEARCH_CANDIDATES)?;
        let candidates = serde_json::to_string(&matches).ok();

        self.run_task(AgentTask::search(query, filters, candidates.as_deref())).await
    }

    pub async fn handle_trending_events(&self) -> Result<AgentReply, CrewError> {
        let trending = self.db.trending_events(TRENDING_CANDIDATES)?;
        let candidates = serde_json::to_string(&trending).ok();
        self.run_task(AgentTask::trending_events(candidates.as_deref())).await
    }

    // ============================================
    // Onboarding agent
    // ============================================

    pub async fn handle_onboarding(&self, student_id: i64) -> Result<AgentReply, CrewError> {
        self.require_student(student_id)?;
        self.run_task(AgentTask::onboarding(student_id)).await
    }

    pub async fn handle_profile_update(
        &self,
        student_id: i64,
        context: Option<&Value>,
    ) -> Result<AgentReply, CrewError> {
        self.require_student(student_id)?;
        self.run_task(AgentTask::profile_update(student_id, context)).await
    }

    async fn run_task(&self, task: AgentTask) -> Result<AgentReply, CrewError> {
        let response = self.runner.run(&task, &[]).await?;
        Ok(AgentReply {
            response,
            agent: task.kind,
        })
    }

    fn require_club(&self, club_id: i64) -> Result<Club, CrewError> {
        self.db
            .get_club(club_id)?
            .ok_or_else(|| CrewError::NotFound("Club not found".to_string()))
    }

    fn require_student(&self, student_id: i64) -> Result<(), CrewError> {
        match self.db.get_student(student_id)? {
            Some(_) => Ok(()),
            None => Err(CrewError::NotFound("Student not found".to_string())),
        }
    }
}

/// Memory key from request context: `session_id`, else `student_id`
fn session_key(context: Option<&Value>) -> Option<String> {
    let ctx = context?;
    match ctx.get("session_id") {
        Some(Value::String(s)) if !s.is_empty() => return Some(format!("session:{}", s)),
        Some(Value::Number(n)) => return Some(format!("session:{}", n)),
        _ => {}
    }
    ctx.get("student_id")
        .and_then(|v| v.as_i64())
        .map(|id| format!("student:{}", id))
}
