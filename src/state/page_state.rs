/// Page state definitions for tracking crawl progress
///
/// A URL enters the visited set the moment it is popped for dispatch, so every
/// state below except `Queued` is recorded against a visited URL.
use std::fmt;

/// Represents the current state of a page in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Active States =====
    /// URL is in the frontier waiting to be popped
    Queued,

    /// URL has been handed to a fetch worker; its extraction result is pending
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched and extracted but no token survived filtering
    Extracted,

    /// Page was fetched, extracted and added to the index
    Indexed,

    // ===== Terminal Skip States =====
    /// Path matched a robots.txt disallow rule; never fetched
    Disallowed,

    // ===== Terminal Error States =====
    /// Network error or non-2xx response; dropped without retry
    FetchFailed,
}

impl PageState {
    /// Returns true if no further processing will happen for the URL
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the URL may still move through the pipeline
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Fetching)
    }

    /// Returns true if the page body made it through extraction
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted | Self::Indexed)
    }

    /// Returns true if the URL was dropped without a fetch
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Disallowed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed)
    }

    /// Returns true if the page was actually requested from its host
    pub fn was_fetched(&self) -> bool {
        matches!(
            self,
            Self::Fetching | Self::Extracted | Self::Indexed | Self::FetchFailed
        )
    }

    /// Checks a lifecycle step against the crawl state machine
    ///
    /// `Queued → Fetching | Disallowed`, then
    /// `Fetching → Extracted | Indexed | FetchFailed`. Terminal states never move.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        match self {
            Self::Queued => matches!(next, Self::Fetching | Self::Disallowed),
            Self::Fetching => matches!(next, Self::Extracted | Self::Indexed | Self::FetchFailed),
            _ => false,
        }
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::Indexed => "indexed",
            Self::Disallowed => "disallowed",
            Self::FetchFailed => "fetch_failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::Fetching,
            Self::Extracted,
            Self::Indexed,
            Self::Disallowed,
            Self::FetchFailed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!PageState::Queued.is_terminal());
        assert!(!PageState::Fetching.is_terminal());

        assert!(PageState::Extracted.is_terminal());
        assert!(PageState::Indexed.is_terminal());
        assert!(PageState::Disallowed.is_terminal());
        assert!(PageState::FetchFailed.is_terminal());
    }

    #[test]
    fn test_categories_are_disjoint() {
        for state in PageState::all_states() {
            let categories = [
                state.is_active(),
                state.is_success(),
                state.is_skipped(),
                state.is_error(),
            ];
            assert_eq!(
                categories.iter().filter(|c| **c).count(),
                1,
                "{} should belong to exactly one category",
                state
            );
        }
    }

    #[test]
    fn test_was_fetched() {
        assert!(PageState::Indexed.was_fetched());
        assert!(PageState::FetchFailed.was_fetched());
        assert!(!PageState::Disallowed.was_fetched());
        assert!(!PageState::Queued.was_fetched());
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(PageState::Queued.can_transition_to(PageState::Fetching));
        assert!(PageState::Fetching.can_transition_to(PageState::Indexed));
        assert!(PageState::Fetching.can_transition_to(PageState::Extracted));
    }

    #[test]
    fn test_skip_and_failure_transitions() {
        assert!(PageState::Queued.can_transition_to(PageState::Disallowed));
        assert!(PageState::Fetching.can_transition_to(PageState::FetchFailed));

        assert!(!PageState::Queued.can_transition_to(PageState::Indexed));
        assert!(!PageState::Fetching.can_transition_to(PageState::Disallowed));
    }

    #[test]
    fn test_terminal_states_never_move() {
        for from in PageState::all_states().into_iter().filter(|s| s.is_terminal()) {
            for to in PageState::all_states() {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Queued), "queued");
        assert_eq!(format!("{}", PageState::FetchFailed), "fetch_failed");
    }
}
