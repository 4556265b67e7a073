use std::env;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_URL: &str = "./.db/clubhub.db";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_RETRY_BASE_MS: u64 = 2000;
pub const DEFAULT_AGENT_MAX_ITERATIONS: usize = 6;
pub const DEFAULT_AGENT_MEMORY_TURNS: usize = 20;
pub const DEFAULT_AGENT_MEMORY_IDLE_MINUTES: u64 = 60;
pub const DEFAULT_AGENT_MEMORY_MAX_SESSIONS: usize = 1000;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub openai_model: String,
    /// First retry backoff; doubles on each further attempt
    pub openai_retry_base_ms: u64,
    /// Max LLM/tool rounds per agent task
    pub agent_max_iterations: usize,
    /// Turns kept per conversation session
    pub agent_memory_turns: usize,
    /// Conversation sessions idle this long are forgotten
    pub agent_memory_idle_minutes: u64,
    pub agent_memory_max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            database_url: string_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            openai_api_base: string_or("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE),
            openai_model: string_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            openai_retry_base_ms: parse_or(&lookup, "OPENAI_RETRY_BASE_MS", DEFAULT_OPENAI_RETRY_BASE_MS),
            agent_max_iterations: parse_or(&lookup, "AGENT_MAX_ITERATIONS", DEFAULT_AGENT_MAX_ITERATIONS)
                .max(1),
            agent_memory_turns: parse_or(&lookup, "AGENT_MEMORY_TURNS", DEFAULT_AGENT_MEMORY_TURNS),
            agent_memory_idle_minutes: parse_or(
                &lookup,
                "AGENT_MEMORY_IDLE_MINUTES",
                DEFAULT_AGENT_MEMORY_IDLE_MINUTES,
            ),
            agent_memory_max_sessions: parse_or(
                &lookup,
                "AGENT_MEMORY_MAX_SESSIONS",
                DEFAULT_AGENT_MEMORY_MAX_SESSIONS,
            )
            .max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{}={:?} is not valid, using default {}", key, raw, default);
            default
        }),
    }
}
