//! Composed search-and-drill-down controller consumed by a renderer.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use shared::domain::{PrimaryEntity, SecondaryEntity, Theme};
use storage::PreferenceStore;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    events::ExplorerEvent,
    gateway::EntityGateway,
    preferences::{load_theme, persist_theme},
    search::{PageState, SearchController, SearchPhase},
    selection::{SelectionController, SelectionPhase},
    state::ExplorerState,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct ExplorerOptions {
    pub page_size: u32,
    pub search_debounce: Duration,
    pub system_prefers_dark: bool,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            system_prefers_dark: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExplorerCommand {
    SetQuery(String),
    QueryChanged(String),
    TriggerSearch { page: u32 },
    NextPage,
    PrevPage,
    Select(PrimaryEntity),
    SelectIndex(usize),
    ClearSelection,
    ToggleTheme,
}

impl ExplorerCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::SetQuery(_) => "set_query",
            Self::QueryChanged(_) => "query_changed",
            Self::TriggerSearch { .. } => "trigger_search",
            Self::NextPage => "next_page",
            Self::PrevPage => "prev_page",
            Self::Select(_) => "select",
            Self::SelectIndex(_) => "select_index",
            Self::ClearSelection => "clear_selection",
            Self::ToggleTheme => "toggle_theme",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExplorerSnapshot {
    pub query: String,
    pub active_query: Option<String>,
    pub entities: Vec<PrimaryEntity>,
    pub page: PageState,
    pub range_label: String,
    pub search_loading: bool,
    pub search_phase: SearchPhase,
    pub selected: Option<PrimaryEntity>,
    pub secondary: Vec<SecondaryEntity>,
    pub secondary_loading: bool,
    pub selection_phase: SelectionPhase,
    pub error: Option<String>,
    pub theme: Theme,
}

impl ExplorerSnapshot {
    fn from_state(state: &ExplorerState) -> Self {
        Self {
            query: state.search.query.clone(),
            active_query: state.search.active_query.clone(),
            entities: state.search.entities.clone(),
            page: state.search.page.clone(),
            range_label: state.search.page.range_label(),
            search_loading: state.search.loading,
            search_phase: state.search.phase,
            selected: state.selection.selected.clone(),
            secondary: state.selection.secondary.clone(),
            secondary_loading: state.selection.loading,
            selection_phase: state.selection.phase,
            error: state.error.clone(),
            theme: state.theme,
        }
    }

    /// True when a search ran and produced nothing, as opposed to no search at all.
    pub fn is_empty_result(&self) -> bool {
        self.active_query.is_some()
            && !self.search_loading
            && self.search_phase == SearchPhase::Success
            && self.entities.is_empty()
    }
}

pub struct Explorer {
    state: Arc<Mutex<ExplorerState>>,
    search: Arc<SearchController>,
    selection: SelectionController,
    preferences: Arc<dyn PreferenceStore>,
    events: broadcast::Sender<ExplorerEvent>,
}

impl Explorer {
    /// Builds the controller and reads the theme preference once.
    pub async fn start(
        gateway: Arc<dyn EntityGateway>,
        preferences: Arc<dyn PreferenceStore>,
        options: ExplorerOptions,
    ) -> Arc<Self> {
        let theme = load_theme(preferences.as_ref(), options.system_prefers_dark).await;
        let page_size = options.page_size.max(1);
        let state = Arc::new(Mutex::new(ExplorerState::new(page_size, theme)));
        let (events, _) = broadcast::channel(256);

        let search = Arc::new(SearchController::new(
            Arc::clone(&gateway),
            Arc::clone(&state),
            events.clone(),
            options.search_debounce,
        ));
        let selection = SelectionController::new(gateway, Arc::clone(&state), events.clone());

        info!(
            page_size,
            theme = theme.as_str(),
            debounce_ms = options.search_debounce.as_millis() as u64,
            "explorer started"
        );

        Arc::new(Self {
            state,
            search,
            selection,
            preferences,
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExplorerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ExplorerSnapshot {
        let guard = self.state.lock().await;
        ExplorerSnapshot::from_state(&guard)
    }

    pub async fn set_query(&self, text: &str) {
        self.search.set_query(text).await;
    }

    pub async fn query_changed(&self, text: &str) -> Option<JoinHandle<()>> {
        self.search.query_changed(text).await
    }

    pub async fn trigger_search(&self, page: u32) {
        self.search.trigger_search(page).await;
    }

    pub async fn next_page(&self) {
        self.search.next_page().await;
    }

    pub async fn prev_page(&self) {
        self.search.prev_page().await;
    }

    pub async fn select(&self, entity: PrimaryEntity) {
        self.selection.select(entity).await;
    }

    /// Selects the entity at `index` in the current results; false if there is none.
    pub async fn select_by_index(&self, index: usize) -> bool {
        let entity = self.state.lock().await.search.entities.get(index).cloned();
        match entity {
            Some(entity) => {
                self.selection.select(entity).await;
                true
            }
            None => false,
        }
    }

    pub async fn clear_selection(&self) {
        self.selection.clear_selection().await;
    }

    /// Flips the theme and persists it. The in-memory flag changes even if persisting fails.
    pub async fn toggle_theme(&self) -> Result<Theme> {
        let theme = {
            let mut guard = self.state.lock().await;
            guard.theme = guard.theme.toggled();
            guard.theme
        };
        let _ = self.events.send(ExplorerEvent::ThemeChanged(theme));
        info!(theme = theme.as_str(), "theme toggled");
        persist_theme(self.preferences.as_ref(), theme).await?;
        Ok(theme)
    }

    pub async fn execute(&self, command: ExplorerCommand) {
        match command {
            ExplorerCommand::SetQuery(text) => self.set_query(&text).await,
            ExplorerCommand::QueryChanged(text) => {
                if let Some(timer) = self.query_changed(&text).await {
                    let _ = timer.await;
                }
            }
            ExplorerCommand::TriggerSearch { page } => self.trigger_search(page).await,
            ExplorerCommand::NextPage => self.next_page().await,
            ExplorerCommand::PrevPage => self.prev_page().await,
            ExplorerCommand::Select(entity) => self.select(entity).await,
            ExplorerCommand::SelectIndex(index) => {
                if !self.select_by_index(index).await {
                    warn!(index, "no search result at index; selection unchanged");
                }
            }
            ExplorerCommand::ClearSelection => self.clear_selection().await,
            ExplorerCommand::ToggleTheme => {
                if let Err(err) = self.toggle_theme().await {
                    warn!(error = %err, "theme preference not persisted");
                }
            }
        }
    }

    /// Runs a command as a background task so UI handlers never wait on the network.
    pub fn dispatch(self: &Arc<Self>, command: ExplorerCommand) -> JoinHandle<()> {
        tracing::debug!(command = command.name(), "dispatching explorer command");
        let explorer = Arc::clone(self);
        tokio::spawn(async move { explorer.execute(command).await })
    }
}

#[cfg(test)]
#[path = "tests/explorer_tests.rs"]
mod tests;
