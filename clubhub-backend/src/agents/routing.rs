use super::definitions::AgentKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// `agent: search` style answers from models that ignore the JSON instruction
static AGENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?im)^\W*agent\W*[:=]\s*"?([a-z][a-z _-]*)"#).unwrap());

/// The master orchestrator's choice of specialist
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub agent: AgentKind,
    pub reason: String,
    pub context: String,
}

#[derive(Deserialize)]
struct RawDecision {
    agent: String,
    #[serde(default)]
    reason: Option<Value>,
    #[serde(default)]
    context: Option<Value>,
}

impl RoutingDecision {
    /// Parse a routing decision out of model output.
    ///
    /// Takes the first JSON object carrying an `agent` key anywhere in the
    /// text (code fences and prose around it are ignored). Returns `None` when
    /// no recognizable agent is named.
    pub fn parse(text: &str) -> Option<Self> {
        for (start, _) in text.match_indices('{') {
            let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<RawDecision>();
            if let Some(Ok(raw)) = stream.next() {
                if let Some(agent) = agent_from_alias(&raw.agent) {
                    return Some(Self {
                        agent,
                        reason: value_to_text(raw.reason),
                        context: value_to_text(raw.context),
                    });
                }
            }
        }

        let caps = AGENT_LINE.captures(text)?;
        let agent = agent_from_alias(caps.get(1)?.as_str())?;
        Some(Self {
            agent,
            reason: String::new(),
            context: String::new(),
        })
    }
}

/// Map the names models use for agents onto `AgentKind`
pub fn agent_from_alias(name: &str) -> Option<AgentKind> {
    let lowered = name.trim().to_lowercase();
    let normalized = NON_ALNUM.replace_all(&lowered, "_");
    let key = normalized.trim_matches('_');
    let key = key.strip_suffix("_agent").unwrap_or(key);

    match key {
        "master" | "master_orchestrator" | "orchestrator" | "none" | "self" => {
            Some(AgentKind::MasterOrchestrator)
        }
        "club_chatbot" | "club" | "chatbot" | "club_chat" | "club_bot" | "clubchatbot" => {
            Some(AgentKind::ClubChatbot)
        }
        "recommendation" | "recommendations" | "recommender" | "recommend" => {
            Some(AgentKind::Recommendation)
        }
        "search" | "event_search" | "searcher" | "events" => Some(AgentKind::Search),
        "onboarding" | "onboard" | "profile" | "profile_update" => Some(AgentKind::Onboarding),
        _ => None,
    }
}

fn value_to_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}
