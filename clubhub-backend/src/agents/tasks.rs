//! Task prompt builders
//!
//! A task is the user-side prompt for one agent run: what to do and what the
//! answer should look like.

use super::definitions::AgentKind;
use crate::ai::Message;
use crate::models::Club;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct AgentTask {
    pub kind: AgentKind,
    pub description: String,
    pub expected_output: String,
}

impl AgentTask {
    fn new(kind: AgentKind, description: String, expected_output: &str) -> Self {
        Self {
            kind,
            description,
            expected_output: expected_output.to_string(),
        }
    }

    /// Render as the user message of an agent run
    pub fn prompt(&self) -> String {
        format!("{}\n\nExpected output: {}", self.description.trim(), self.expected_output)
    }

    // ============================================
    // Master orchestrator
    // ============================================

    pub fn routing(query: &str, context: Option<&Value>) -> Self {
        Self::new(
            AgentKind::MasterOrchestrator,
            format!(
                "Decide which specialist should handle this student query.\n\n\
                 Student query: {}\n{}\n\
                 Specialists:\n\
                 - club_chatbot: questions about one specific club\n\
                 - recommendation: personalized suggestions for events or clubs\n\
                 - search: finding events by topic, date, place or type\n\
                 - onboarding: new users, profile setup or profile updates\n\
                 - master: none of the above; you will answer yourself\n\n\
                 Reply with a single JSON object and nothing else:\n\
                 {{\"agent\": \"<specialist>\", \"reason\": \"<one sentence>\", \
                 \"context\": \"<what the specialist needs to know, including any IDs>\"}}",
                query,
                context_block(context)
            ),
            "A JSON routing decision with agent, reason and context",
        )
    }

    pub fn context_management(history: &[Message]) -> Self {
        let transcript = history
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(
            AgentKind::MasterOrchestrator,
            format!(
                "Condense this conversation so it can continue without the full transcript. \
                 Keep the student's goals, preferences, IDs mentioned and any open questions.\n\n{}",
                transcript
            ),
            "A short summary of the conversation context",
        )
    }

    /// The master answering on its own when no specialist fits or routing failed
    pub fn direct_answer(query: &str, context: Option<&Value>) -> Self {
        Self::new(
            AgentKind::MasterOrchestrator,
            format!(
                "Answer this student query yourself.\n\nStudent query: {}\n{}",
                query,
                context_block(context)
            ),
            "A helpful, accurate answer for the student",
        )
    }

    /// A query routed to a specialist by the master orchestrator
    pub fn delegated(kind: AgentKind, query: &str, routing_context: &str, context: Option<&Value>) -> Self {
        let routing = if routing_context.trim().is_empty() {
            String::new()
        } else {
            format!("Notes from the orchestrator: {}\n", routing_context)
        };
        Self::new(
            kind,
            format!(
                "A student asked: {}\n{}{}",
                query,
                routing,
                context_block(context)
            ),
            "A direct answer to the student's query",
        )
    }

    // ============================================
    // Club chatbot
    // ============================================

    pub fn club_info(club: &Club, question: &str) -> Self {
        let voice = club
            .personality_style
            .as_deref()
            .map(|style| format!("Answer in this club's voice: {}.\n", style))
            .unwrap_or_default();
        Self::new(
            AgentKind::ClubChatbot,
            format!(
                "Answer a student's question about {} (club_id {}).\n\n\
                 Question: {}\n\n\
                 Draw on the club's mission and history, its members, its upcoming events, \
                 how to join, and its contact details or website where relevant.\n{}",
                club.name, club.id, question, voice
            ),
            "A detailed, personalized answer about the club",
        )
    }

    pub fn application_help(club: &Club, student_id: i64) -> Self {
        Self::new(
            AgentKind::ClubChatbot,
            format!(
                "Help student {} apply to {} (club_id {}).\n\n\
                 Cover:\n\
                 1. Step-by-step instructions to join\n\
                 2. Information the student should prepare\n\
                 3. Relevant deadlines from the club's upcoming events\n\
                 4. Where to apply or who to contact for follow-up questions",
                student_id, club.name, club.id
            ),
            "Complete application guidance",
        )
    }

    // ============================================
    // Recommendation agent
    // ============================================

    pub fn personalized_recommendations(student_id: i64) -> Self {
        Self::new(
            AgentKind::Recommendation,
            format!(
                "Recommend events and clubs for student {}.\n\n\
                 Steps:\n\
                 1. Load the student, their profile and their activity\n\
                 2. Find similar students and what they joined\n\
                 3. Search upcoming events matching their skills and goals\n\
                 4. Prefer events whose deadline or date is close\n\n\
                 For each recommendation give the title, a match score from 0 to 100, \
                 why it fits, and its date or deadline.",
                student_id
            ),
            "A ranked list of recommendations with explanations",
        )
    }

    pub fn weekly_digest(student_id: i64) -> Self {
        Self::new(
            AgentKind::Recommendation,
            format!(
                "Write this week's digest for student {}.\n\n\
                 Include the top 5 events for them this week, clubs that match their interests, \
                 trending events, upcoming deadlines and one skill worth developing.",
                student_id
            ),
            "A short, engaging newsletter-style digest",
        )
    }

    // ============================================
    // Search agent
    // ============================================

    pub fn search(query: &str, filters: Option<&Value>, candidates: Option<&str>) -> Self {
        let filters = match filters {
            Some(f) if !is_empty_object(f) => f.to_string(),
            _ => "none".to_string(),
        };
        let candidates = candidates
            .map(|c| format!("\nIndex matches (may be incomplete):\n{}\n", c))
            .unwrap_or_default();
        Self::new(
            AgentKind::Search,
            format!(
                "Find events for this request.\n\n\
                 Query: {}\n\
                 Filters: {}\n{}\n\
                 Identify topics, synonyms and intent, apply the filters, rank by relevance, \
                 and flag trending events or events with few seats left.",
                query, filters, candidates
            ),
            "A ranked list of matching events with key details",
        )
    }

    pub fn trending_events(candidates: Option<&str>) -> Self {
        let candidates = candidates
            .map(|c| format!("\nCurrent trending data:\n{}\n", c))
            .unwrap_or_default();
        Self::new(
            AgentKind::Search,
            format!(
                "Present the events trending on the platform right now.{}\n\
                 For each event explain why it is trending, how many seats remain \
                 and its registration deadline.",
                candidates
            ),
            "A list of trending events with urgency indicators",
        )
    }

    // ============================================
    // Onboarding agent
    // ============================================

    pub fn onboarding(student_id: i64) -> Self {
        Self::new(
            AgentKind::Onboarding,
            format!(
                "Onboard student {}.\n\n\
                 1. Welcome them\n\
                 2. Ask a short questionnaire: field of study, year, interests, skills, goals\n\
                 3. Ask how they want to be notified\n\
                 4. Show 3-5 matching clubs and 3-5 upcoming events\n\
                 5. End with one concrete first action",
                student_id
            ),
            "An onboarding message with personalized first recommendations",
        )
    }

    pub fn profile_update(student_id: i64, context: Option<&Value>) -> Self {
        Self::new(
            AgentKind::Onboarding,
            format!(
                "Help student {} refresh their profile based on recent activity.\n{}\n\
                 Review the events they registered for and the clubs they joined, ask about \
                 new skills and changed interests, then suggest new opportunities that match.",
                student_id,
                context_block(context)
            ),
            "Suggested profile changes and adjusted recommendations",
        )
    }
}

fn is_empty_object(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn context_block(context: Option<&Value>) -> String {
    match context {
        Some(ctx) if !is_empty_object(ctx) => format!("Context: {}\n", ctx),
        _ => String::new(),
    }
}
