use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{AccountId, PrimaryEntity, RepositoryId, SecondaryEntity},
    error::GatewayError,
};
use tokio::sync::oneshot;

use crate::gateway::{EntityGateway, SearchPage};

type SearchResult = Result<SearchPage, GatewayError>;
type SecondaryResult = Result<Vec<SecondaryEntity>, GatewayError>;

enum Reply<T> {
    Ready(T),
    Deferred(oneshot::Receiver<T>),
}

impl<T> Reply<T> {
    async fn resolve(self, endpoint: &str) -> Result<T, GatewayError> {
        match self {
            Reply::Ready(value) => Ok(value),
            Reply::Deferred(rx) => rx
                .await
                .map_err(|_| GatewayError::transport(endpoint, "scripted reply dropped")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

/// In-process gateway whose replies are queued up front or released later
/// through a oneshot sender, so tests decide the completion order.
#[derive(Default)]
pub struct ScriptedGateway {
    search_replies: Mutex<VecDeque<Reply<SearchResult>>>,
    secondary_replies: Mutex<HashMap<String, VecDeque<Reply<SecondaryResult>>>>,
    search_calls: Mutex<Vec<SearchCall>>,
    secondary_calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_search(&self, result: SearchResult) {
        self.search_replies
            .lock()
            .expect("lock")
            .push_back(Reply::Ready(result));
    }

    pub fn defer_search(&self) -> oneshot::Sender<SearchResult> {
        let (tx, rx) = oneshot::channel();
        self.search_replies
            .lock()
            .expect("lock")
            .push_back(Reply::Deferred(rx));
        tx
    }

    pub fn push_secondary(&self, login: &str, result: SecondaryResult) {
        self.secondary_replies
            .lock()
            .expect("lock")
            .entry(login.to_string())
            .or_default()
            .push_back(Reply::Ready(result));
    }

    pub fn defer_secondary(&self, login: &str) -> oneshot::Sender<SecondaryResult> {
        let (tx, rx) = oneshot::channel();
        self.secondary_replies
            .lock()
            .expect("lock")
            .entry(login.to_string())
            .or_default()
            .push_back(Reply::Deferred(rx));
        tx
    }

    pub fn search_calls(&self) -> Vec<SearchCall> {
        self.search_calls.lock().expect("lock").clone()
    }

    pub fn secondary_calls(&self) -> Vec<String> {
        self.secondary_calls.lock().expect("lock").clone()
    }

    pub async fn wait_for_search_calls(&self, count: usize) {
        for _ in 0..10_000 {
            if self.search_calls.lock().expect("lock").len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("gateway never received {count} search calls");
    }

    pub async fn wait_for_secondary_calls(&self, count: usize) {
        for _ in 0..10_000 {
            if self.secondary_calls.lock().expect("lock").len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("gateway never received {count} secondary calls");
    }
}

#[async_trait]
impl EntityGateway for ScriptedGateway {
    async fn search_primary(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, GatewayError> {
        self.search_calls.lock().expect("lock").push(SearchCall {
            query: query.to_string(),
            page,
            page_size,
        });
        let reply = self.search_replies.lock().expect("lock").pop_front();
        match reply {
            Some(reply) => reply.resolve("/search/users").await?,
            None => Err(GatewayError::transport("/search/users", "no scripted reply")),
        }
    }

    async fn fetch_secondary(&self, login: &str) -> Result<Vec<SecondaryEntity>, GatewayError> {
        self.secondary_calls
            .lock()
            .expect("lock")
            .push(login.to_string());
        let reply = self
            .secondary_replies
            .lock()
            .expect("lock")
            .get_mut(login)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(reply) => reply.resolve("/users/repos").await?,
            None => Err(GatewayError::transport("/users/repos", "no scripted reply")),
        }
    }
}

pub fn account(id: i64, login: &str) -> PrimaryEntity {
    PrimaryEntity {
        id: AccountId(id),
        login: login.to_string(),
        avatar_url: format!("https://avatars.example.test/u/{id}"),
        html_url: format!("https://github.example.test/{login}"),
        public_repos: None,
        score: 1.0,
    }
}

pub fn accounts(count: usize, prefix: &str) -> Vec<PrimaryEntity> {
    (0..count)
        .map(|idx| account(idx as i64 + 1, &format!("{prefix}{idx}")))
        .collect()
}

pub fn repository(id: i64, owner: &str, name: &str) -> SecondaryEntity {
    SecondaryEntity {
        id: RepositoryId(id),
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        description: None,
        html_url: format!("https://github.example.test/{owner}/{name}"),
        stargazers_count: 3,
        language: Some("Rust".to_string()),
        updated_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp"),
    }
}

pub fn page_of(items: Vec<PrimaryEntity>, total_count: u64) -> SearchPage {
    SearchPage { items, total_count }
}
