//! Request generations for superseding in-flight discovery.
//!
//! Generations come from one process-wide counter, so they never repeat.
//! Each session (one rider's search box) records only its latest
//! generation; a token is current while its session still records it.
//! Starting a new discovery replaces the record and the older token's
//! pipeline stops at its next checkpoint. A session whose record was
//! evicted has no current token.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache as MokaCache;

use super::error::DiscoveryError;

/// Latest generation per session key.
type SessionMap = MokaCache<String, u64>;

/// Token carried by one discovery run.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    /// `None` for detached tokens.
    session: Option<(SessionMap, String)>,
    generation: u64,
}

impl GenerationToken {
    /// A token no one else holds; never superseded.
    pub fn detached() -> Self {
        Self {
            session: None,
            generation: 0,
        }
    }

    /// The generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer discovery has started for the same session.
    pub fn is_current(&self) -> bool {
        match &self.session {
            None => true,
            Some((sessions, key)) => sessions.get(key) == Some(self.generation),
        }
    }

    pub fn ensure_current(&self) -> Result<(), DiscoveryError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(DiscoveryError::Superseded)
        }
    }
}

/// Per-session latest generations.
///
/// Idle sessions expire so the map stays bounded.
#[derive(Clone)]
pub struct Generations {
    next: Arc<AtomicU64>,
    sessions: SessionMap,
}

impl Generations {
    pub fn new(idle: Duration, max_sessions: u64) -> Self {
        let sessions = MokaCache::builder()
            .time_to_idle(idle)
            .max_capacity(max_sessions)
            .build();
        Self {
            next: Arc::new(AtomicU64::new(0)),
            sessions,
        }
    }

    /// Start a new discovery for `session`, superseding any earlier one.
    pub fn begin(&self, session: &str) -> GenerationToken {
        let generation = self.next.fetch_add(1, Ordering::AcqRel) + 1;
        // Concurrent begins may land out of order; the highest wins.
        self.sessions
            .entry(session.to_string())
            .and_upsert_with(|existing| {
                existing.map_or(generation, |e| e.into_value().max(generation))
            });

        GenerationToken {
            session: Some((self.sessions.clone(), session.to_string())),
            generation,
        }
    }
}

impl Default for Generations {
    fn default() -> Self {
        Self::new(Duration::from_secs(600), 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_is_always_current() {
        let token = GenerationToken::detached();
        assert!(token.is_current());
        assert!(token.ensure_current().is_ok());
    }

    #[test]
    fn newer_begin_supersedes() {
        let generations = Generations::default();

        let first = generations.begin("rider-1");
        assert!(first.is_current());

        let second = generations.begin("rider-1");
        assert!(!first.is_current());
        assert_eq!(first.ensure_current(), Err(DiscoveryError::Superseded));
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn sessions_are_independent() {
        let generations = Generations::default();

        let a = generations.begin("a");
        let _b = generations.begin("b");
        assert!(a.is_current());
    }

    #[test]
    fn generations_never_repeat_across_sessions() {
        let generations = Generations::default();

        let a = generations.begin("a");
        let b = generations.begin("b");
        assert_ne!(a.generation(), b.generation());
    }

    #[test]
    fn evicted_session_fails_closed() {
        let generations = Generations::new(Duration::from_secs(600), 1);

        let old = generations.begin("rider");
        for i in 0..50 {
            generations.begin(&format!("other-{i}"));
            generations.sessions.run_pending_tasks();
        }
        let newer = generations.begin("rider");
        generations.sessions.run_pending_tasks();

        assert!(!old.is_current());
        assert_eq!(old.ensure_current(), Err(DiscoveryError::Superseded));
        assert!(newer.generation() > old.generation());
    }
}
