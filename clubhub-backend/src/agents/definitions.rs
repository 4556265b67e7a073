//! Agent personas
//!
//! Every agent is a persona (role, goal, backstory) plus the tools it may
//! call. Only the master orchestrator delegates to other agents.

use crate::tools::builtin::DATABASE_TOOL_NAME;
use serde::Serialize;
use strum::{AsRefStr, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentKind {
    MasterOrchestrator,
    ClubChatbot,
    Recommendation,
    Search,
    Onboarding,
}

#[derive(Debug, Clone, Copy)]
pub struct AgentPersona {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub allow_delegation: bool,
}

impl AgentKind {
    /// Name reported to API clients in `AgentResponse.agent`
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::MasterOrchestrator => "Master Orchestrator",
            AgentKind::ClubChatbot => "Club Chatbot",
            AgentKind::Recommendation => "Recommendation Agent",
            AgentKind::Search => "Search Agent",
            AgentKind::Onboarding => "Onboarding Agent",
        }
    }

    pub fn persona(&self) -> AgentPersona {
        match self {
            AgentKind::MasterOrchestrator => AgentPersona {
                role: "Master Orchestrator",
                goal: "Understand what a student needs and hand the request to the specialist best placed to answer it",
                backstory: "You are the front desk of ClubHub, the university's club and event platform. \
                    You know what every specialist agent can do, you keep track of the conversation so far, \
                    and when no specialist fits you answer the student yourself.",
                allow_delegation: true,
            },
            AgentKind::ClubChatbot => AgentPersona {
                role: "Club Chatbot",
                goal: "Answer questions about a specific club accurately and in that club's own voice",
                backstory: "You speak on behalf of a student club. You know its mission, history, members \
                    and upcoming events from the database, and you help students decide whether and how to join.",
                allow_delegation: false,
            },
            AgentKind::Recommendation => AgentPersona {
                role: "Recommendation Agent",
                goal: "Suggest events and clubs that fit a student's skills, interests, activity and timing",
                backstory: "You study each student's profile, skills, memberships and registrations, compare \
                    them with similar students, and explain every suggestion in one or two concrete sentences.",
                allow_delegation: false,
            },
            AgentKind::Search => AgentPersona {
                role: "Search Agent",
                goal: "Turn natural-language requests into precise event searches and present ranked results",
                backstory: "You read a student's request, pick out topics, synonyms, dates and places, query \
                    the event database, and point out events that are trending or almost full.",
                allow_delegation: false,
            },
            AgentKind::Onboarding => AgentPersona {
                role: "Onboarding Agent",
                goal: "Welcome new students, complete their profile and show them value on day one",
                backstory: "You guide first-time users through a short questionnaire, keep profiles up to date \
                    as students grow, and always finish with a few clubs and events they can act on right away.",
                allow_delegation: false,
            },
        }
    }

    /// Tools this agent may call
    pub fn tool_names(&self) -> &'static [&'static str] {
        &[DATABASE_TOOL_NAME]
    }

    /// System prompt built from the persona
    pub fn system_prompt(&self) -> String {
        let persona = self.persona();
        let mut prompt = format!(
            "You are the {}.\n\nGoal: {}\n\n{}\n\n\
             Use the {} tool to look up real data before stating facts about students, clubs or events. \
             Never invent IDs, dates or seat counts. Keep answers friendly and concise.",
            persona.role, persona.goal, persona.backstory, DATABASE_TOOL_NAME
        );
        if persona.allow_delegation {
            prompt.push_str(
                "\n\nSpecialists you can delegate to: club_chatbot (questions about a specific club), \
                 recommendation (personalized suggestions), search (finding events), \
                 onboarding (new users and profile updates).",
            );
        }
        prompt
    }
}
