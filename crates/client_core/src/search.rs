//! Search lifecycle: query text, paged primary entities, and the shared error slot.
//!
//! Overlapping searches are not fenced. Whichever response completes last
//! overwrites the state, even if it belongs to an older request.

use std::{sync::Arc, time::Duration};

use shared::{domain::PrimaryEntity, error::GatewayError};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    events::ExplorerEvent,
    gateway::{EntityGateway, SearchPage},
    pagination::{paginate, PageBounds},
    state::ExplorerState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub total_count: u64,
    pub page_size: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub displayed_range_start: u64,
    pub displayed_range_end: u64,
}

impl PageState {
    pub fn empty(page_size: u32) -> Self {
        Self {
            current_page: 1,
            total_count: 0,
            page_size,
            has_next_page: false,
            has_prev_page: false,
            displayed_range_start: 0,
            displayed_range_end: 0,
        }
    }

    fn from_bounds(page: u32, total_count: u64, page_size: u32, bounds: PageBounds) -> Self {
        Self {
            current_page: page,
            total_count,
            page_size,
            has_next_page: bounds.has_next_page,
            has_prev_page: bounds.has_prev_page,
            displayed_range_start: bounds.displayed_range_start,
            displayed_range_end: bounds.displayed_range_end,
        }
    }

    pub fn bounds(&self) -> PageBounds {
        PageBounds {
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            displayed_range_start: self.displayed_range_start,
            displayed_range_end: self.displayed_range_end,
        }
    }

    pub fn range_label(&self) -> String {
        self.bounds().describe(self.total_count)
    }
}

#[derive(Debug, Clone)]
pub struct SearchState {
    /// Pending text as typed; trimmed only when a search is triggered.
    pub query: String,
    /// Query that produced the current results; `None` means no active search.
    pub active_query: Option<String>,
    pub entities: Vec<PrimaryEntity>,
    pub page: PageState,
    pub loading: bool,
    pub phase: SearchPhase,
    edit_generation: u64,
}

impl SearchState {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            active_query: None,
            entities: Vec::new(),
            page: PageState::empty(page_size),
            loading: false,
            phase: SearchPhase::Idle,
            edit_generation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_query.is_some()
    }

    fn reset(&mut self) {
        self.active_query = None;
        self.entities.clear();
        self.page = PageState::empty(self.page.page_size);
        self.loading = false;
        self.phase = SearchPhase::Idle;
    }

    fn begin(&mut self, query: &str) {
        self.active_query = Some(query.to_string());
        self.loading = true;
        self.phase = SearchPhase::Searching;
    }

    fn apply_success(&mut self, query: &str, page: u32, response: SearchPage) {
        let page_size = self.page.page_size;
        let bounds = paginate(response.total_count, page_size, page, response.items.len());
        self.active_query = Some(query.to_string());
        self.entities = response.items;
        self.page = PageState::from_bounds(page, response.total_count, page_size, bounds);
        self.loading = false;
        self.phase = SearchPhase::Success;
    }

    fn apply_failure(&mut self, query: &str, page: u32) {
        let page_size = self.page.page_size;
        self.active_query = Some(query.to_string());
        self.entities.clear();
        self.page = PageState::from_bounds(page, 0, page_size, paginate(0, page_size, page, 0));
        self.loading = false;
        self.phase = SearchPhase::Failed;
    }

    fn bump_generation(&mut self) -> u64 {
        self.edit_generation = self.edit_generation.wrapping_add(1);
        self.edit_generation
    }
}

pub fn search_failure_message(query: &str, err: &GatewayError) -> String {
    format!("Search for \"{query}\" failed: {}.", err.user_message())
}

pub struct SearchController {
    gateway: Arc<dyn EntityGateway>,
    state: Arc<Mutex<ExplorerState>>,
    events: broadcast::Sender<ExplorerEvent>,
    debounce: Duration,
}

impl SearchController {
    pub fn new(
        gateway: Arc<dyn EntityGateway>,
        state: Arc<Mutex<ExplorerState>>,
        events: broadcast::Sender<ExplorerEvent>,
        debounce: Duration,
    ) -> Self {
        Self {
            gateway,
            state,
            events,
            debounce,
        }
    }

    /// Stores the pending text and cancels any debounced trigger. No network activity.
    pub async fn set_query(&self, text: &str) {
        let mut guard = self.state.lock().await;
        guard.search.query = text.to_string();
        guard.search.bump_generation();
    }

    /// Stores the text and schedules a first-page search once typing pauses.
    ///
    /// Returns the timer task, or `None` when debouncing is disabled and the
    /// search already ran.
    pub async fn query_changed(self: &Arc<Self>, text: &str) -> Option<JoinHandle<()>> {
        let generation = {
            let mut guard = self.state.lock().await;
            guard.search.query = text.to_string();
            guard.search.bump_generation()
        };

        if self.debounce.is_zero() {
            self.trigger_search(1).await;
            return None;
        }

        let controller = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::time::sleep(controller.debounce).await;
            let current = controller.state.lock().await.search.edit_generation;
            if current != generation {
                debug!(generation, current, "debounced search superseded by a later edit");
                return;
            }
            controller.run_search(1).await;
        }))
    }

    pub async fn trigger_search(&self, page: u32) {
        self.state.lock().await.search.bump_generation();
        self.run_search(page).await;
    }

    pub async fn next_page(&self) {
        let target = {
            let guard = self.state.lock().await;
            guard
                .search
                .page
                .has_next_page
                .then(|| guard.search.page.current_page + 1)
        };
        match target {
            Some(page) => self.trigger_search(page).await,
            None => debug!("next page unavailable; ignoring"),
        }
    }

    pub async fn prev_page(&self) {
        let target = {
            let guard = self.state.lock().await;
            guard
                .search
                .page
                .has_prev_page
                .then(|| guard.search.page.current_page - 1)
        };
        match target {
            Some(page) => self.trigger_search(page).await,
            None => debug!("previous page unavailable; ignoring"),
        }
    }

    async fn run_search(&self, page: u32) {
        let page = page.max(1);
        let (query, page_size) = {
            let mut guard = self.state.lock().await;
            let query = guard.search.query.trim().to_string();
            if query.is_empty() {
                guard.search.reset();
                guard.error = None;
                drop(guard);
                info!("empty query; search state reset");
                let _ = self.events.send(ExplorerEvent::SearchReset);
                return;
            }
            guard.error = None;
            guard.search.begin(&query);
            (query, guard.search.page.page_size)
        };

        info!(query = %query, page, page_size, "search started");
        let _ = self.events.send(ExplorerEvent::SearchStarted {
            query: query.clone(),
            page,
        });

        let result = self.gateway.search_primary(&query, page, page_size).await;

        let mut guard = self.state.lock().await;
        match result {
            Ok(response) => {
                let returned = response.items.len();
                let total_count = response.total_count;
                guard.search.apply_success(&query, page, response);
                let has_next_page = guard.search.page.has_next_page;
                drop(guard);
                info!(query = %query, page, returned, total_count, has_next_page, "search completed");
                let _ = self.events.send(ExplorerEvent::SearchCompleted {
                    query,
                    page,
                    total_count,
                    returned,
                });
            }
            Err(err) => {
                let message = search_failure_message(&query, &err);
                guard.search.apply_failure(&query, page);
                guard.error = Some(message.clone());
                drop(guard);
                warn!(query = %query, page, error = %err, "search failed");
                let _ = self.events.send(ExplorerEvent::SearchFailed { query, message });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
