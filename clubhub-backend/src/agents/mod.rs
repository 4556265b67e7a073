//! Multi-agent layer
//!
//! A master orchestrator reads each free-text student query, picks a
//! specialist (club chatbot, recommendation, search, onboarding) and hands the
//! query over. Specialists can also be called directly.
//!
//! ```text
//! query → routing task (master) → RoutingDecision → specialist task → answer
//!                                 └─ unparseable → master answers directly
//! ```
//!
//! Every agent run is a loop of model calls and `query_database` tool calls,
//! capped at `AGENT_MAX_ITERATIONS`.

pub mod crew;
pub mod definitions;
pub mod memory;
pub mod routing;
pub mod runner;
pub mod tasks;

pub use crew::{AgentReply, Crew, CrewError};
