//! State-transition notifications for renderers.

use shared::domain::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    SearchReset,
    SearchStarted {
        query: String,
        page: u32,
    },
    SearchCompleted {
        query: String,
        page: u32,
        total_count: u64,
        returned: usize,
    },
    SearchFailed {
        query: String,
        message: String,
    },
    SelectionChanged {
        login: String,
    },
    SelectionCleared,
    SecondaryLoaded {
        login: String,
        count: usize,
    },
    SecondaryFailed {
        login: String,
        message: String,
    },
    /// A response arrived for a selection that has since been replaced.
    SecondaryDiscarded {
        login: String,
    },
    ThemeChanged(Theme),
}
