use serde::{Deserialize, Serialize};

use crate::domain::{PrimaryEntity, SecondaryEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<PrimaryEntity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchUsersQuery<'a> {
    pub q: &'a str,
    pub per_page: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySort {
    Created,
    #[default]
    Updated,
    Pushed,
    FullName,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRepositoriesQuery {
    pub per_page: u32,
    pub sort: RepositorySort,
}

pub type ListRepositoriesResponse = Vec<SecondaryEntity>;
