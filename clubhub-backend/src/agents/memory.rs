use crate::ai::Message;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

struct SessionHistory {
    messages: VecDeque<Message>,
    last_touched: Instant,
    /// Recency order for eviction; higher is more recent
    touch_seq: u64,
}

/// Per-session conversation history shared across requests.
///
/// A turn is one user message plus the answer to it. Each session keeps at
/// most `max_turns` turns; older ones are dropped first. `max_turns == 0`
/// disables memory.
///
/// Sessions idle for longer than `idle_ttl` are forgotten, and at most
/// `max_sessions` are kept (least recently used go first).
pub struct ConversationMemory {
    sessions: DashMap<String, SessionHistory>,
    max_turns: usize,
    idle_ttl: Duration,
    max_sessions: usize,
    seq: AtomicU64,
}

impl ConversationMemory {
    pub fn with_limits(max_turns: usize, idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
            idle_ttl,
            max_sessions: max_sessions.max(1),
            seq: AtomicU64::new(0),
        }
    }

    fn is_expired(&self, entry: &SessionHistory) -> bool {
        entry.last_touched.elapsed() >= self.idle_ttl
    }

    pub fn history(&self, session: &str) -> Vec<Message> {
        self.sessions
            .get(session)
            .filter(|h| !self.is_expired(h))
            .map(|h| h.messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of messages stored for a session
    pub fn len(&self, session: &str) -> usize {
        self.sessions
            .get(session)
            .filter(|h| !self.is_expired(h))
            .map(|h| h.messages.len())
            .unwrap_or(0)
    }

    /// Whether the session has reached its turn limit
    pub fn is_full(&self, session: &str) -> bool {
        self.max_turns > 0 && self.len(session) >= self.max_turns * 2
    }

    pub fn record(&self, session: &str, user: &str, assistant: &str) {
        if self.max_turns == 0 {
            return;
        }
        self.prune(session);

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let mut entry = self
            .sessions
            .entry(session.to_string())
            .or_insert_with(|| SessionHistory {
                messages: VecDeque::new(),
                last_touched: Instant::now(),
                touch_seq: seq,
            });
        if self.is_expired(&entry) {
            entry.messages.clear();
        }
        entry.last_touched = Instant::now();
        entry.touch_seq = seq;
        entry.messages.push_back(Message::user(user));
        entry.messages.push_back(Message::assistant(assistant));
        while entry.messages.len() > self.max_turns * 2 {
            entry.messages.pop_front();
        }
    }

    /// Replace a session's history with a condensed summary
    pub fn replace_with_summary(&self, session: &str, summary: &str) {
        if self.max_turns == 0 {
            return;
        }
        let mut condensed = VecDeque::with_capacity(2);
        condensed.push_back(Message::assistant(format!(
            "Summary of the conversation so far: {}",
            summary
        )));
        self.sessions.insert(
            session.to_string(),
            SessionHistory {
                messages: condensed,
                last_touched: Instant::now(),
                touch_seq: self.seq.fetch_add(1, Ordering::Relaxed),
            },
        );
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop idle sessions, then the least recently used ones so that
    /// `keep` still fits under `max_sessions`
    fn prune(&self, keep: &str) {
        self.sessions.retain(|key, h| key == keep || !self.is_expired(h));

        let budget = if self.sessions.contains_key(keep) {
            self.max_sessions
        } else {
            self.max_sessions - 1
        };
        let excess = self.sessions.len().saturating_sub(budget);
        if excess == 0 {
            return;
        }

        let mut by_age: Vec<(u64, String)> = self
            .sessions
            .iter()
            .filter(|e| e.key() != keep)
            .map(|e| (e.value().touch_seq, e.key().clone()))
            .collect();
        by_age.sort_unstable();
        for (_, key) in by_age.into_iter().take(excess) {
            self.sessions.remove(&key);
        }
        log::debug!("[MEMORY] Evicted {} idle conversation session(s)", excess);
    }
}
