//! Dependent-fetch lifecycle for the selected primary entity.
//!
//! Every selection takes a fresh token. A completed fetch is applied only while
//! its token is still current, so a slow response for an earlier selection can
//! never land under a newer one.

use std::sync::Arc;

use shared::{
    domain::{PrimaryEntity, SecondaryEntity},
    error::GatewayError,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{events::ExplorerEvent, gateway::EntityGateway, state::ExplorerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    NoSelection,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionToken(u64);

#[derive(Debug, Clone)]
pub struct SelectionState {
    pub selected: Option<PrimaryEntity>,
    pub secondary: Vec<SecondaryEntity>,
    pub loading: bool,
    pub phase: SelectionPhase,
    token: SelectionToken,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected: None,
            secondary: Vec::new(),
            loading: false,
            phase: SelectionPhase::NoSelection,
            token: SelectionToken(0),
        }
    }
}

impl SelectionState {
    pub fn token(&self) -> SelectionToken {
        self.token
    }

    pub fn is_current(&self, token: SelectionToken) -> bool {
        self.token == token
    }

    fn next_token(&mut self) -> SelectionToken {
        self.token = SelectionToken(self.token.0.wrapping_add(1));
        self.token
    }

    fn begin(&mut self, entity: PrimaryEntity) -> SelectionToken {
        self.selected = Some(entity);
        self.secondary.clear();
        self.loading = true;
        self.phase = SelectionPhase::Loading;
        self.next_token()
    }

    fn clear(&mut self) {
        self.selected = None;
        self.secondary.clear();
        self.loading = false;
        self.phase = SelectionPhase::NoSelection;
        self.next_token();
    }

    fn apply_loaded(&mut self, items: Vec<SecondaryEntity>) {
        self.secondary = items;
        self.loading = false;
        self.phase = SelectionPhase::Loaded;
    }

    fn apply_failed(&mut self) {
        self.secondary.clear();
        self.loading = false;
        self.phase = SelectionPhase::Failed;
    }
}

pub fn secondary_failure_message(login: &str, err: &GatewayError) -> String {
    format!("Could not load repositories for {login}: {}.", err.user_message())
}

pub struct SelectionController {
    gateway: Arc<dyn EntityGateway>,
    state: Arc<Mutex<ExplorerState>>,
    events: broadcast::Sender<ExplorerEvent>,
}

impl SelectionController {
    pub fn new(
        gateway: Arc<dyn EntityGateway>,
        state: Arc<Mutex<ExplorerState>>,
        events: broadcast::Sender<ExplorerEvent>,
    ) -> Self {
        Self {
            gateway,
            state,
            events,
        }
    }

    pub async fn select(&self, entity: PrimaryEntity) {
        let login = entity.login.clone();
        let token = {
            let mut guard = self.state.lock().await;
            guard.error = None;
            guard.selection.begin(entity)
        };

        info!(login = %login, ?token, "selection changed; fetching repositories");
        let _ = self.events.send(ExplorerEvent::SelectionChanged {
            login: login.clone(),
        });

        let result = self.gateway.fetch_secondary(&login).await;

        let mut guard = self.state.lock().await;
        if !guard.selection.is_current(token) {
            let current = guard.selection.token();
            drop(guard);
            debug!(login = %login, ?token, ?current, "discarding stale repository response");
            let _ = self.events.send(ExplorerEvent::SecondaryDiscarded { login });
            return;
        }

        match result {
            Ok(items) => {
                let count = items.len();
                guard.selection.apply_loaded(items);
                drop(guard);
                info!(login = %login, count, "repositories loaded");
                let _ = self
                    .events
                    .send(ExplorerEvent::SecondaryLoaded { login, count });
            }
            Err(err) => {
                let message = secondary_failure_message(&login, &err);
                guard.selection.apply_failed();
                guard.error = Some(message.clone());
                drop(guard);
                warn!(login = %login, error = %err, "repository fetch failed");
                let _ = self
                    .events
                    .send(ExplorerEvent::SecondaryFailed { login, message });
            }
        }
    }

    /// Drops the selection and fences off any fetch still in flight.
    pub async fn clear_selection(&self) {
        self.state.lock().await.selection.clear();
        info!("selection cleared");
        let _ = self.events.send(ExplorerEvent::SelectionCleared);
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
