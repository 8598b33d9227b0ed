//! # User list snapshot
//!
//! [`UserList`] holds the client's copy of the user collection together with the
//! flags the view needs to decide what to draw. A fetch is a two-step affair so
//! the store call can be awaited without holding the state:
//!
//! 1. [`begin_fetch`](UserList::begin_fetch) raises the right indicator and hands
//!    out a [`FetchTicket`] stamped with a fresh generation;
//! 2. [`finish_fetch`](UserList::finish_fetch) applies the outcome, but only if the
//!    ticket is still the most recently issued one. Older completions are dropped,
//!    so overlapping refreshes resolve as last-issued-wins.
//!
//! A successful result replaces the snapshot wholesale. A failure leaves the
//! previous items untouched and records the error, which the view shows in place
//! of the table.

use std::collections::HashSet;

use store::{StoreError, UserRecord};
use tracing::{debug, info, warn};

/// Which indicator a fetch drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    /// First load of the view: full-page spinner.
    Initial,
    /// User-requested reload: the list stays visible.
    Refresh,
}

/// Proof of an issued fetch, returned to [`UserList::finish_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    mode: FetchMode,
}

impl FetchTicket {
    pub fn mode(&self) -> FetchMode {
        self.mode
    }
}

/// The list snapshot plus loading and error state.
#[derive(Clone, Debug, PartialEq)]
pub struct UserList {
    items: Vec<UserRecord>,
    is_loading: bool,
    is_refreshing: bool,
    error: Option<String>,
    generation: u64,
}

impl Default for UserList {
    /// Nothing fetched yet, so the view starts on the loading spinner.
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            is_refreshing: false,
            error: None,
            generation: 0,
        }
    }
}

impl UserList {
    pub fn items(&self) -> &[UserRecord] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Raise the indicator for `mode` and issue a new generation.
    pub fn begin_fetch(&mut self, mode: FetchMode) -> FetchTicket {
        self.generation += 1;
        match mode {
            FetchMode::Initial => self.is_loading = true,
            FetchMode::Refresh => self.is_refreshing = true,
        }
        debug!(generation = self.generation, ?mode, "fetch issued");
        FetchTicket {
            generation: self.generation,
            mode,
        }
    }

    /// Apply the outcome of a fetch. Returns `false` if the ticket was superseded
    /// and the outcome was discarded.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<UserRecord>, StoreError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "discarding superseded fetch"
            );
            return false;
        }
        self.is_loading = false;
        self.is_refreshing = false;
        match result {
            Ok(users) => {
                self.items = normalize(users);
                self.error = None;
                info!("loaded {} users", self.items.len());
            }
            Err(err) => {
                warn!("failed to load users: {err}");
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Put a freshly created record at the head of the list without re-fetching.
    pub fn record_created(&mut self, user: UserRecord) {
        self.items.retain(|u| u.id != user.id);
        self.items.insert(0, user);
    }
}

/// Order by `created` descending (stable) and drop repeated ids, first one wins.
fn normalize(mut users: Vec<UserRecord>) -> Vec<UserRecord> {
    users.sort_by(|a, b| b.created.cmp(&a.created));
    let mut seen = HashSet::new();
    users.retain(|u| seen.insert(u.id.clone()));
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(id: &str, created: &str) -> UserRecord {
        serde_json::from_value(json!({
            "id": id,
            "email": format!("{id}@example.com"),
            "created": created,
        }))
        .unwrap()
    }

    #[test]
    fn test_starts_loading() {
        let list = UserList::default();
        assert!(list.is_loading());
        assert!(!list.is_refreshing());
        assert!(list.items().is_empty());
        assert_eq!(list.error(), None);
    }

    #[test]
    fn test_load_sorts_and_dedups() {
        let mut list = UserList::default();
        let ticket = list.begin_fetch(FetchMode::Initial);
        let applied = list.finish_fetch(
            ticket,
            Ok(vec![
                user("old", "2024-01-01 00:00:00.000Z"),
                user("new", "2024-01-03 00:00:00.000Z"),
                user("mid", "2024-01-02 00:00:00.000Z"),
                user("new", "2024-01-03 00:00:00.000Z"),
            ]),
        );
        assert!(applied);
        let ids: Vec<_> = list.items().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
        assert!(!list.is_loading());
    }

    #[test]
    fn test_error_then_success_clears_error() {
        let mut list = UserList::default();
        let ticket = list.begin_fetch(FetchMode::Initial);
        list.finish_fetch(ticket, Err(StoreError::Transport("network down".into())));
        assert_eq!(list.error(), Some("network down"));
        assert!(!list.is_loading());

        let ticket = list.begin_fetch(FetchMode::Refresh);
        assert!(list.is_refreshing());
        list.finish_fetch(ticket, Ok(vec![user("a", "2024-01-01 00:00:00.000Z")]));
        assert_eq!(list.error(), None);
        assert!(!list.is_refreshing());
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn test_failure_keeps_previous_items() {
        let mut list = UserList::default();
        let ticket = list.begin_fetch(FetchMode::Initial);
        list.finish_fetch(ticket, Ok(vec![user("a", "2024-01-01 00:00:00.000Z")]));

        let ticket = list.begin_fetch(FetchMode::Refresh);
        list.finish_fetch(ticket, Err(StoreError::response(500, "boom")));
        assert_eq!(list.error(), Some("boom"));
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn test_latest_error_replaces_previous() {
        let mut list = UserList::default();
        let ticket = list.begin_fetch(FetchMode::Initial);
        list.finish_fetch(ticket, Err(StoreError::response(500, "first")));
        let ticket = list.begin_fetch(FetchMode::Refresh);
        list.finish_fetch(ticket, Err(StoreError::response(503, "second")));
        assert_eq!(list.error(), Some("second"));
    }

    #[test]
    fn test_superseded_refresh_is_discarded() {
        let mut list = UserList::default();
        let first = list.begin_fetch(FetchMode::Refresh);
        let second = list.begin_fetch(FetchMode::Refresh);

        // The later request resolves first.
        assert!(list.finish_fetch(second, Ok(vec![user("fresh", "2024-01-02 00:00:00.000Z")])));
        assert!(!list.finish_fetch(first, Ok(vec![user("stale", "2024-01-01 00:00:00.000Z")])));

        assert_eq!(list.items()[0].id, "fresh");
        assert!(!list.is_refreshing());
        assert!(!list.is_loading());
    }

    #[test]
    fn test_stale_completion_does_not_clear_indicator() {
        let mut list = UserList::default();
        let initial = list.begin_fetch(FetchMode::Initial);
        let refresh = list.begin_fetch(FetchMode::Refresh);
        list.finish_fetch(initial, Ok(Vec::new()));
        assert!(list.is_loading());
        assert!(list.is_refreshing());
        list.finish_fetch(refresh, Ok(Vec::new()));
        assert!(!list.is_loading());
        assert!(!list.is_refreshing());
    }

    #[test]
    fn test_record_created_goes_first_regardless_of_created() {
        let mut list = UserList::default();
        let ticket = list.begin_fetch(FetchMode::Initial);
        list.finish_fetch(
            ticket,
            Ok(vec![
                user("b", "2024-01-02 00:00:00.000Z"),
                user("a", "2024-01-01 00:00:00.000Z"),
            ]),
        );
        list.record_created(user("ancient", "2000-01-01 00:00:00.000Z"));
        let ids: Vec<_> = list.items().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["ancient", "b", "a"]);
    }

    #[test]
    fn test_record_created_replaces_same_id() {
        let mut list = UserList::default();
        let ticket = list.begin_fetch(FetchMode::Initial);
        list.finish_fetch(
            ticket,
            Ok(vec![
                user("b", "2024-01-02 00:00:00.000Z"),
                user("a", "2024-01-01 00:00:00.000Z"),
            ]),
        );
        list.record_created(user("a", "2024-01-01 00:00:00.000Z"));
        let ids: Vec<_> = list.items().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
