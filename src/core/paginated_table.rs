//! Server-paginated table state.
//!
//! Every change of page, page size or filters yields a [`FetchTicket`]; the
//! caller fetches with it and hands the result back through
//! [`PaginatedTable::complete`]. Responses for superseded tickets are
//! dropped, and a failed fetch leaves the previous rows on screen.

use crate::domain::model::{
    GridPaginationModel, PaginationState, Problem, ProblemFilters, ServerPage,
};
use crate::domain::ports::PageSource;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_page_size_options;

pub const NO_ROWS_TEXT: &str = "No Data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Idle,
    Loading,
    Error(String),
}

/// One issued fetch: the parameters to request and its sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket<F> {
    seq: u64,
    pub state: PaginationState,
    pub filters: F,
}

#[derive(Debug, Clone)]
pub struct PaginatedTable<R, F = ProblemFilters> {
    state: PaginationState,
    filters: F,
    page_size_options: Vec<u32>,
    page: Option<ServerPage<R>>,
    status: TableStatus,
    issued: u64,
}

pub type ProblemsTable = PaginatedTable<Problem, ProblemFilters>;

impl<R, F: Clone + Default + PartialEq> PaginatedTable<R, F> {
    pub fn new(page_size_options: Vec<u32>, default_page_size: u32) -> Result<Self> {
        validate_page_size_options("page_size_options", &page_size_options)?;
        if !page_size_options.contains(&default_page_size) {
            return Err(AdminError::PaginationError {
                message: format!(
                    "default page size {} is not one of {:?}",
                    default_page_size, page_size_options
                ),
            });
        }

        Ok(Self {
            state: PaginationState {
                page: 1,
                page_size: default_page_size,
            },
            filters: F::default(),
            page_size_options,
            page: None,
            status: TableStatus::Idle,
            issued: 0,
        })
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    pub fn page_size_options(&self) -> &[u32] {
        &self.page_size_options
    }

    pub fn status(&self) -> &TableStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == TableStatus::Loading
    }

    /// The last page received, if any.
    pub fn page(&self) -> Option<&ServerPage<R>> {
        self.page.as_ref()
    }

    pub fn rows(&self) -> &[R] {
        self.page.as_ref().map(|p| p.data.as_slice()).unwrap_or(&[])
    }

    pub fn row_count(&self) -> u64 {
        self.page.as_ref().map(|p| p.total).unwrap_or(0)
    }

    /// Number of pages implied by the server's total and the current size.
    pub fn pages_count(&self) -> u64 {
        let size = u64::from(self.state.page_size);
        self.row_count().div_ceil(size)
    }

    /// Zero-based model for the grid.
    pub fn grid_model(&self) -> GridPaginationModel {
        GridPaginationModel {
            page: self.state.page - 1,
            page_size: self.state.page_size,
        }
    }

    /// Overlay text in place of rows; `None` while loading (spinner) or
    /// when there is something to show.
    pub fn overlay(&self) -> Option<&'static str> {
        if self.is_loading() || !self.rows().is_empty() {
            None
        } else {
            Some(NO_ROWS_TEXT)
        }
    }

    fn check(&self, state: PaginationState) -> Result<()> {
        if state.page < 1 {
            return Err(AdminError::PaginationError {
                message: format!("page must be >= 1, got {}", state.page),
            });
        }
        if !self.page_size_options.contains(&state.page_size) {
            return Err(AdminError::PaginationError {
                message: format!(
                    "page size {} is not one of {:?}",
                    state.page_size, self.page_size_options
                ),
            });
        }
        Ok(())
    }

    fn issue(&mut self) -> FetchTicket<F> {
        self.issued += 1;
        self.status = TableStatus::Loading;
        tracing::debug!(
            "📄 Fetch #{} page={} page_size={}",
            self.issued,
            self.state.page,
            self.state.page_size
        );
        FetchTicket {
            seq: self.issued,
            state: self.state,
            filters: self.filters.clone(),
        }
    }

    /// Ticket for the current parameters, changed or not (initial load, retry).
    pub fn refresh(&mut self) -> FetchTicket<F> {
        self.issue()
    }

    /// Overwrite the pagination state. Invalid states are rejected and
    /// leave the table untouched; an unchanged state needs no fetch.
    pub fn set_pagination(&mut self, state: PaginationState) -> Result<Option<FetchTicket<F>>> {
        self.check(state)?;
        if state == self.state {
            return Ok(None);
        }
        self.state = state;
        Ok(Some(self.issue()))
    }

    /// Page-change event from the grid (zero-based page).
    pub fn on_grid_change(&mut self, model: GridPaginationModel) -> Result<Option<FetchTicket<F>>> {
        tracing::debug!("📄 Pagination model change: {:?}", model);
        let page = model.page.checked_add(1).ok_or_else(|| AdminError::PaginationError {
            message: format!("page index {} is out of range", model.page),
        })?;
        self.set_pagination(PaginationState {
            page,
            page_size: model.page_size,
        })
    }

    /// New filters always restart from the first page.
    pub fn set_filters(&mut self, filters: F) -> Option<FetchTicket<F>> {
        if filters == self.filters {
            return None;
        }
        self.filters = filters;
        self.state.page = 1;
        Some(self.issue())
    }

    /// Apply the outcome of `ticket`'s fetch. Returns `false` if the ticket
    /// was superseded and the outcome ignored.
    pub fn complete(&mut self, ticket: &FetchTicket<F>, outcome: Result<ServerPage<R>>) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(
                "📄 Dropping stale response #{} (latest #{})",
                ticket.seq,
                self.issued
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                if !page.is_consistent() {
                    tracing::warn!(
                        "⚠️ Server page has {} rows but total {}",
                        page.data.len(),
                        page.total
                    );
                }
                self.page = Some(page);
                self.status = TableStatus::Idle;
            }
            Err(e) => {
                tracing::warn!("❌ Error fetching data: {}", e);
                self.status = TableStatus::Error(e.to_string());
            }
        }
        true
    }

    /// Fetch `ticket` from `source` and apply the result.
    pub async fn load<S>(&mut self, source: &S, ticket: FetchTicket<F>) -> bool
    where
        S: PageSource<Row = R, Filters = F> + ?Sized,
    {
        let outcome = source.fetch_page(ticket.state, &ticket.filters).await;
        self.complete(&ticket, outcome)
    }
}

impl<R> PaginatedTable<R, ProblemFilters> {
    /// Title search box; an empty string clears the filter.
    pub fn set_title(&mut self, title: &str) -> Option<FetchTicket<ProblemFilters>> {
        let mut filters = self.filters.clone();
        filters.title = (!title.is_empty()).then(|| title.to_string());
        self.set_filters(filters)
    }

    pub fn set_difficulty(&mut self, difficulty: Option<String>) -> Option<FetchTicket<ProblemFilters>> {
        let mut filters = self.filters.clone();
        filters.difficulty = difficulty;
        self.set_filters(filters)
    }

    pub fn set_has_checker(&mut self, has_checker: Option<bool>) -> Option<FetchTicket<ProblemFilters>> {
        let mut filters = self.filters.clone();
        filters.has_checker = has_checker;
        self.set_filters(filters)
    }
}
