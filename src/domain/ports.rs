use crate::domain::model::{ListResponse, NamedEntity, PaginationState, ServerPage};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Anything that serves server-paginated rows.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Row: Send;
    type Filters: Clone + Default + PartialEq + Send + Sync;

    async fn fetch_page(
        &self,
        state: PaginationState,
        filters: &Self::Filters,
    ) -> Result<ServerPage<Self::Row>>;
}

/// CRUD access to the admin REST resources. `resource` is the path segment,
/// e.g. `suppliers` or `unit-measures-ratios`.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    async fn search(&self, resource: &str, term: Option<&str>) -> Result<ListResponse<NamedEntity>>;
    async fn fetch(&self, resource: &str, id: i64) -> Result<Value>;
    async fn create(&self, resource: &str, body: &Value) -> Result<Value>;
    async fn update(&self, resource: &str, id: i64, body: &Value) -> Result<Value>;
}

/// Toast-style user notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier: everything goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!("✅ {}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("❌ {}", message);
    }
}
