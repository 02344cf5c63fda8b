use std::time::{Duration, Instant};

use crate::team_search::{MIN_QUERY_LEN, Team};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const BLUR_GRACE: Duration = Duration::from_millis(200);

/// Suggestion-list phase. `Pending` means a lookup has been dispatched and
/// its result has not come back yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Pending,
    Open,
    Closed,
}

/// A lookup the caller must dispatch, tagged with the sequence number that
/// stale results are checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub seq: u64,
    pub query: String,
}

/// Autocomplete controller for one team field, driven entirely by the caller
/// (keystrokes in, lookup requests out, wall-clock injected through `now`).
/// Lookup errors never reach it: the search layer always resolves a list.
#[derive(Debug)]
pub struct Combobox {
    query: String,
    committed_logo: Option<String>,
    list: ListState,
    suggestions: Vec<Team>,
    cursor: isize,
    no_results: bool,
    debounce_deadline: Option<Instant>,
    blur_deadline: Option<Instant>,
    next_seq: u64,
    latest_seq: u64,
}

impl Combobox {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            committed_logo: None,
            list: ListState::Idle,
            suggestions: Vec::new(),
            cursor: -1,
            no_results: false,
            debounce_deadline: None,
            blur_deadline: None,
            next_seq: 0,
            latest_seq: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn committed_logo(&self) -> Option<&str> {
        self.committed_logo.as_deref()
    }

    pub fn suggestions(&self) -> &[Team] {
        &self.suggestions
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn list_state(&self) -> ListState {
        self.list
    }

    pub fn is_open(&self) -> bool {
        self.list == ListState::Open
    }

    pub fn is_loading(&self) -> bool {
        self.list == ListState::Pending
    }

    /// True when the last completed lookup for a long-enough query was empty.
    pub fn no_results(&self) -> bool {
        self.no_results && self.query.trim().chars().count() >= MIN_QUERY_LEN
    }

    /// Typing invalidates any committed selection and restarts the debounce.
    pub fn push_char(&mut self, ch: char, now: Instant) {
        self.query.push(ch);
        self.on_edit(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        if self.query.pop().is_some() {
            self.on_edit(now);
        }
    }

    fn on_edit(&mut self, now: Instant) {
        self.committed_logo = None;
        self.no_results = false;
        self.debounce_deadline = Some(now + DEBOUNCE);
    }

    /// Advances the timers. Returns the lookup to dispatch when the debounce
    /// deadline fires unsuperseded; short queries close the list instead,
    /// never touching the network.
    pub fn poll(&mut self, now: Instant) -> Option<LookupRequest> {
        if self.blur_deadline.is_some_and(|deadline| deadline <= now) {
            self.blur_deadline = None;
            self.debounce_deadline = None;
            self.close();
        }

        let deadline = self.debounce_deadline?;
        if deadline > now {
            return None;
        }
        self.debounce_deadline = None;

        if self.query.trim().chars().count() < MIN_QUERY_LEN {
            self.suggestions.clear();
            self.close();
            return None;
        }

        self.next_seq += 1;
        self.latest_seq = self.next_seq;
        self.list = ListState::Pending;
        Some(LookupRequest {
            seq: self.latest_seq,
            query: self.query.clone(),
        })
    }

    /// Applies a completed lookup. Results from a superseded request are
    /// discarded; returns whether the result was applied.
    pub fn on_results(&mut self, seq: u64, teams: Vec<Team>) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.no_results = teams.is_empty();
        self.list = if teams.is_empty() {
            ListState::Closed
        } else {
            ListState::Open
        };
        self.suggestions = teams;
        self.cursor = -1;
        true
    }

    /// Cursor moves clamp to [-1, len-1]; no wraparound.
    pub fn cursor_down(&mut self) {
        if self.is_open() {
            let last = self.suggestions.len() as isize - 1;
            self.cursor = (self.cursor + 1).min(last);
        }
    }

    pub fn cursor_up(&mut self) {
        if self.is_open() {
            self.cursor = (self.cursor - 1).max(-1);
        }
    }

    /// Commits the cursored candidate, if any: the query becomes the team
    /// name, the logo is remembered, and the list closes without scheduling
    /// another lookup.
    pub fn commit(&mut self) -> Option<Team> {
        if !self.is_open() || self.cursor < 0 {
            return None;
        }
        let team = self.suggestions.get(self.cursor as usize)?.clone();
        self.query = team.name.clone();
        self.committed_logo = Some(team.logo.clone());
        self.debounce_deadline = None;
        self.close();
        Some(team)
    }

    pub fn on_escape(&mut self) {
        self.close();
    }

    pub fn on_tab(&mut self) {
        self.close();
    }

    /// Focus loss closes the list only after a short grace window, so a
    /// selection landing inside it still registers.
    pub fn on_focus_lost(&mut self, now: Instant) {
        self.blur_deadline = Some(now + BLUR_GRACE);
    }

    pub fn on_focus(&mut self) {
        self.blur_deadline = None;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn close(&mut self) {
        self.list = ListState::Closed;
        self.cursor = -1;
    }
}

impl Default for Combobox {
    fn default() -> Self {
        Self::new()
    }
}
