use shared::domain::Theme;

use crate::{search::SearchState, selection::SelectionState};

/// Everything a renderer needs, guarded by one lock so the error slot has a single owner.
#[derive(Debug, Clone)]
pub struct ExplorerState {
    pub search: SearchState,
    pub selection: SelectionState,
    pub error: Option<String>,
    pub theme: Theme,
}

impl ExplorerState {
    pub fn new(page_size: u32, theme: Theme) -> Self {
        Self {
            search: SearchState::new(page_size),
            selection: SelectionState::default(),
            error: None,
            theme,
        }
    }
}
