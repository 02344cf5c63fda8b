use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::team_search::Team;

pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct CacheEntry {
    teams: Vec<Team>,
    expires_at: Instant,
}

/// Per-session search cache keyed by lowercased query.
///
/// Expiry is lazy: an entry is checked against `now` on read, and the
/// provider loop calls `sweep` periodically. Re-inserting a key whose entry
/// is still fresh replaces the value but keeps the original expiry deadline,
/// so a later write falls to the earlier write's schedule. No capacity bound.
#[derive(Debug, Default)]
pub struct TeamCache {
    entries: HashMap<String, CacheEntry>,
}

impl TeamCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &str, now: Instant) -> Option<&[Team]> {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            self.entries.remove(key);
        }
        self.entries.get(key).map(|entry| entry.teams.as_slice())
    }

    pub fn put(&mut self, key: &str, teams: Vec<Team>, now: Instant) {
        let expires_at = match self.entries.get(key) {
            Some(prior) if prior.expires_at > now => prior.expires_at,
            _ => now + CACHE_TTL,
        };
        self.entries
            .insert(key.to_string(), CacheEntry { teams, expires_at });
    }

    pub fn sweep(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
