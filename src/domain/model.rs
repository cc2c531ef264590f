use serde::{Deserialize, Serialize};

/// Page size offered by the problems grid when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One entry of an async select: `value` is what gets written into a form,
/// `title` is only ever displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableOption {
    pub value: i64,
    pub title: String,
}

impl SearchableOption {
    pub fn new(value: i64, title: impl Into<String>) -> Self {
        Self {
            value,
            title: title.into(),
        }
    }
}

/// Static option with a string key, used by the non-async multiple select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedOption {
    pub key: String,
    pub title: String,
}

impl KeyedOption {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

/// Any record that can be offered in a select: the server's `{id, name}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl From<NamedEntity> for SearchableOption {
    fn from(entity: NamedEntity) -> Self {
        SearchableOption::new(entity.id, entity.name)
    }
}

/// Envelope of the entity list endpoints (`GET /<resource>/?search=`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn into_options(self) -> Vec<SearchableOption>
    where
        T: Into<SearchableOption>,
    {
        self.results.into_iter().map(Into::into).collect()
    }
}

/// Envelope of server-paginated endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPage<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub pages_count: u32,
}

impl<T> ServerPage<T> {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page,
            page_size,
            count: 0,
            pages_count: 0,
        }
    }

    /// The server promises `total >= data.len()`; a page that breaks it is
    /// still shown but worth a warning.
    pub fn is_consistent(&self) -> bool {
        self.total >= self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Free-text and enum filters of the problems listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFilters {
    pub title: Option<String>,
    pub difficulty: Option<String>,
    pub has_checker: Option<bool>,
}

impl ProblemFilters {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.difficulty.is_none() && self.has_checker.is_none()
    }
}

/// One-based page plus page size, as sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Zero-based pagination model as emitted by a data grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPaginationModel {
    pub page: u32,
    pub page_size: u32,
}

/// Query string of `GET /problems/`. `None` filters are left out entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(rename = "has_checker", skip_serializing_if = "Option::is_none")]
    pub has_checker: Option<bool>,
    pub page: u32,
    pub page_size: u32,
}

impl ProblemQuery {
    pub fn new(state: PaginationState, filters: &ProblemFilters) -> Self {
        Self {
            title: filters.title.clone(),
            difficulty: filters.difficulty.clone(),
            has_checker: filters.has_checker,
            page: state.page,
            page_size: state.page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub has_solved: bool,
    #[serde(default)]
    pub has_attempted: bool,
}

/// Row of the problems listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub difficulty: i64,
    #[serde(default)]
    pub difficulty_title: String,
    #[serde(default)]
    pub solved: u64,
    #[serde(default)]
    pub not_solved: u64,
    #[serde(default)]
    pub attempts_count: u64,
    #[serde(default)]
    pub has_checker: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub has_solution: bool,
    #[serde(default)]
    pub solution_kepcoin_value: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub dislikes_count: u64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub author_username: Option<String>,
    #[serde(default)]
    pub user_info: UserInfo,
}

/// Currency record (`/currencies/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub side: String,
    pub main: bool,
}

/// Organization record. `currency` comes back either as an id or as a
/// nested `{id, name}` object depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub additional_info: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, deserialize_with = "reference_id")]
    pub currency: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageType {
    pub id: i64,
    pub name: String,
    pub order_number: i64,
    #[serde(default)]
    pub status: bool,
}

fn reference_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reference {
        Id(i64),
        Nested(NamedEntity),
    }

    Ok(Option::<Reference>::deserialize(deserializer)?.map(|r| match r {
        Reference::Id(id) => id,
        Reference::Nested(entity) => entity.id,
    }))
}
