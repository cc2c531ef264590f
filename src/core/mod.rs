pub mod columns;
pub mod entities;
pub mod entity_form;
pub mod paginated_table;
pub mod schema;
pub mod search_select;

pub use crate::domain::ports::{EntityGateway, Notifier, PageSource};
pub use crate::utils::error::Result;
