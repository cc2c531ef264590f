pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::http::HttpApi;
pub use crate::config::AdminConfig;
pub use crate::core::entities::EntityKind;
pub use crate::core::entity_form::{EntityForm, SubmitOutcome};
pub use crate::core::paginated_table::{PaginatedTable, ProblemsTable};
pub use crate::core::search_select::{AsyncSearchSelect, MultiSearchSelect, MultipleSelect};
pub use crate::domain::ports::LogNotifier;
pub use crate::utils::error::{AdminError, Result};
