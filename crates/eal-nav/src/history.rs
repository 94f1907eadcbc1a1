//! Session History
//!
//! The host side of `history.pushState`, `back`, `forward` and `go`.
//! Moving the cursor yields the entry whose state the `popstate` event carries.

use url::Url;

use crate::NavResult;

/// State object of an entry pushed by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub route: String,
}

/// History entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: Url,
    pub title: String,
    pub state: Option<HistoryState>,
}

impl HistoryEntry {
    /// Route carried by the state object, if any
    pub fn route(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.route.as_str())
    }

    /// Non-empty URL fragment
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment().filter(|f| !f.is_empty())
    }
}

/// Non-empty fragment of `url`, or `None` when it has none or does not parse
pub fn fragment_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?
        .fragment()
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

/// Joint session history of the page
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    current: usize,
}

impl SessionHistory {
    pub fn new(initial_url: &str) -> NavResult<Self> {
        Ok(Self {
            entries: vec![HistoryEntry {
                url: Url::parse(initial_url)?,
                title: String::new(),
                state: None,
            }],
            current: 0,
        })
    }

    /// Push a new entry; `url` may be relative (`#services`) to the current one.
    /// Forward entries are discarded.
    pub fn push_state(&mut self, state: Option<HistoryState>, title: &str, url: &str) -> NavResult<()> {
        let url = self.current().url.join(url)?;
        self.entries.truncate(self.current + 1);
        self.entries.push(HistoryEntry { url, title: title.to_string(), state });
        self.current = self.entries.len() - 1;
        tracing::trace!("pushState -> {} ({} entries)", self.current().url, self.entries.len());
        Ok(())
    }

    /// Go back
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        self.go(-1)
    }

    /// Go forward
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        self.go(1)
    }

    /// Move `delta` entries; out of range or zero leaves history unchanged
    pub fn go(&mut self, delta: i32) -> Option<&HistoryEntry> {
        if delta == 0 {
            return None;
        }
        let target = self.current.checked_add_signed(delta as isize)?;
        if target >= self.entries.len() {
            return None;
        }
        self.current = target;
        Some(&self.entries[self.current])
    }

    /// Current entry
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(route: &str) -> Option<HistoryState> {
        Some(HistoryState { route: route.into() })
    }

    #[test]
    fn test_push_relative_fragment() {
        let mut history = SessionHistory::new("https://empowerabilitylabs.example/index.html").unwrap();
        history.push_state(state("services"), "Services", "#services").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().url.as_str(), "https://empowerabilitylabs.example/index.html#services");
        assert_eq!(history.current().fragment(), Some("services"));
        assert_eq!(history.current().route(), Some("services"));
    }

    #[test]
    fn test_back_forward() {
        let mut history = SessionHistory::new("https://example.com/").unwrap();
        history.push_state(state("a"), "", "#a").unwrap();
        history.push_state(state("b"), "", "#b").unwrap();

        assert_eq!(history.back().and_then(|e| e.route()), Some("a"));
        assert_eq!(history.back().map(|e| e.state.clone()), Some(None));
        assert!(history.back().is_none());
        assert_eq!(history.forward().and_then(|e| e.route()), Some("a"));
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut history = SessionHistory::new("https://example.com/").unwrap();
        history.push_state(state("a"), "", "#a").unwrap();
        history.push_state(state("b"), "", "#b").unwrap();
        history.back();
        history.push_state(state("c"), "", "#c").unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_go_out_of_range() {
        let mut history = SessionHistory::new("https://example.com/").unwrap();
        history.push_state(state("a"), "", "#a").unwrap();
        assert!(history.go(-5).is_none());
        assert!(history.go(3).is_none());
        assert!(history.go(0).is_none());
        assert_eq!(history.index(), 1);
        assert_eq!(history.go(-1).map(|e| e.url.as_str()), Some("https://example.com/"));
    }

    #[test]
    fn test_fragment_of() {
        assert_eq!(fragment_of("https://example.com/#services").as_deref(), Some("services"));
        assert_eq!(fragment_of("https://example.com/#"), None);
        assert_eq!(fragment_of("https://example.com/"), None);
        assert_eq!(fragment_of("not a url"), None);
    }

    #[test]
    fn test_invalid_initial_url() {
        assert!(SessionHistory::new("::nope").is_err());
    }
}
