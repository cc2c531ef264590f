//! Async searchable selects.
//!
//! A select never talks to the network itself: typing produces a
//! [`SearchTicket`], the caller runs the query and hands the options back
//! with that ticket. Only the newest ticket is accepted, so a slow response
//! for `"w"` can't overwrite the results for `"wid"`.

use crate::domain::model::{KeyedOption, SearchableOption};
use crate::domain::ports::EntityGateway;
use crate::utils::error::Result;

pub const LOADING_TEXT: &str = "Loading";
pub const NO_OPTIONS_TEXT: &str = "No data";

/// Identifies one issued search. Only the latest ticket's options are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    term: Option<String>,
}

impl SearchTicket {
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }
}

/// Term, options and in-flight bookkeeping shared by the async selects.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    term: Option<String>,
    options: Vec<SearchableOption>,
    loading: bool,
    issued: u64,
}

impl SearchState {
    /// An empty term means "no filter" and is sent without `search=`.
    fn begin(&mut self, term: &str) -> SearchTicket {
        self.issued += 1;
        self.term = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self.loading = true;
        SearchTicket {
            seq: self.issued,
            term: self.term.clone(),
        }
    }

    fn accept(&mut self, ticket: &SearchTicket, options: Vec<SearchableOption>) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(
                "🔎 Dropping stale options for {:?} (ticket {} < {})",
                ticket.term,
                ticket.seq,
                self.issued
            );
            return false;
        }
        self.options = options;
        self.loading = false;
        true
    }

    fn fail(&mut self, ticket: &SearchTicket) {
        if ticket.seq == self.issued {
            self.loading = false;
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn options(&self) -> &[SearchableOption] {
        &self.options
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn find(&self, value: i64) -> Option<&SearchableOption> {
        self.options.iter().find(|option| option.value == value)
    }
}

/// Common surface of the async selects so one driver can feed either.
pub trait Searchable {
    fn search_state(&mut self) -> &mut SearchState;

    /// Re-derive the displayed selection after the options changed.
    fn refresh_selection(&mut self);

    /// Record a keystroke and get the ticket for the query to issue.
    fn set_search(&mut self, term: &str) -> SearchTicket {
        self.search_state().begin(term)
    }

    /// Install options for `ticket`; returns `false` when the ticket is stale.
    fn apply_options(&mut self, ticket: &SearchTicket, options: Vec<SearchableOption>) -> bool {
        let applied = self.search_state().accept(ticket, options);
        if applied {
            self.refresh_selection();
        }
        applied
    }

    /// A failed search keeps the previous options.
    fn search_failed(&mut self, ticket: &SearchTicket) {
        self.search_state().fail(ticket);
    }
}

/// Type `term` into `select` and load matching `resource` records from `gateway`.
///
/// Returns whether the response was applied (it isn't when a newer search
/// was issued in between).
pub async fn run_search<S, G>(select: &mut S, gateway: &G, resource: &str, term: &str) -> Result<bool>
where
    S: Searchable + ?Sized,
    G: EntityGateway + ?Sized,
{
    let ticket = select.set_search(term);
    match gateway.search(resource, ticket.term()).await {
        Ok(list) => Ok(select.apply_options(&ticket, list.into_options())),
        Err(e) => {
            tracing::warn!("🔎 Search in {} for {:?} failed: {}", resource, ticket.term(), e);
            select.search_failed(&ticket);
            Err(e)
        }
    }
}

/// Single-value async select; emits the chosen option's `value`.
#[derive(Debug, Clone, Default)]
pub struct AsyncSearchSelect {
    label: String,
    state: SearchState,
    value: Option<i64>,
    selected: Option<SearchableOption>,
    open: bool,
    error: Option<String>,
}

impl AsyncSearchSelect {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn options(&self) -> &[SearchableOption] {
        self.state.options()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn term(&self) -> Option<&str> {
        self.state.term()
    }

    /// The option currently shown, if the bound value is among the options.
    pub fn selected(&self) -> Option<&SearchableOption> {
        self.selected.as_ref()
    }

    pub fn value(&self) -> Option<i64> {
        self.value
    }

    /// External change of the bound value (form reset, prefill).
    pub fn set_value(&mut self, value: Option<i64>) {
        self.value = value;
        self.refresh_selection();
    }

    /// User picked `option` (or cleared the field); returns what the form stores.
    pub fn select(&mut self, option: Option<&SearchableOption>) -> Option<i64> {
        self.selected = option.cloned();
        self.value = option.map(|o| o.value);
        self.value
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Text a renderer shows in place of the dropdown list.
    pub fn placeholder_text(&self) -> Option<&'static str> {
        if self.state.is_loading() {
            Some(LOADING_TEXT)
        } else if self.state.options().is_empty() {
            Some(NO_OPTIONS_TEXT)
        } else {
            None
        }
    }
}

impl Searchable for AsyncSearchSelect {
    fn search_state(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn refresh_selection(&mut self) {
        self.selected = self.value.and_then(|v| self.state.find(v).cloned());
    }
}

/// Multi-value async select; emits the ids of every chosen option.
#[derive(Debug, Clone, Default)]
pub struct MultiSearchSelect {
    label: String,
    state: SearchState,
    values: Vec<i64>,
    selected: Vec<SearchableOption>,
    error: Option<String>,
}

impl MultiSearchSelect {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn options(&self) -> &[SearchableOption] {
        self.state.options()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn selected(&self) -> &[SearchableOption] {
        &self.selected
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn set_values(&mut self, values: Vec<i64>) {
        self.values = values;
        self.refresh_selection();
    }

    /// Replace the whole selection; returns the ids written to the form.
    pub fn select(&mut self, options: &[SearchableOption]) -> Vec<i64> {
        self.selected = options.to_vec();
        self.values = options.iter().map(|o| o.value).collect();
        self.values.clone()
    }

    /// Add one option unless it's already chosen.
    pub fn add(&mut self, option: &SearchableOption) -> Vec<i64> {
        if !self.values.contains(&option.value) {
            self.selected.push(option.clone());
            self.values.push(option.value);
        }
        self.values.clone()
    }

    pub fn remove(&mut self, value: i64) -> Vec<i64> {
        self.selected.retain(|o| o.value != value);
        self.values.retain(|&v| v != value);
        self.values.clone()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Searchable for MultiSearchSelect {
    fn search_state(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn refresh_selection(&mut self) {
        let state = &self.state;
        self.selected = self
            .values
            .iter()
            .filter_map(|&v| state.find(v).cloned())
            .collect();
    }
}

/// Multiple select over a fixed, string-keyed option list.
#[derive(Debug, Clone, Default)]
pub struct MultipleSelect {
    label: String,
    options: Vec<KeyedOption>,
    values: Vec<String>,
    selected: Vec<KeyedOption>,
    loading: bool,
}

impl MultipleSelect {
    pub fn new(label: impl Into<String>, options: Vec<KeyedOption>) -> Self {
        Self {
            label: label.into(),
            options,
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_options(&mut self, options: Vec<KeyedOption>) {
        self.options = options;
        self.refresh_selection();
    }

    pub fn set_values(&mut self, values: Vec<String>) {
        self.values = values;
        self.refresh_selection();
    }

    pub fn select(&mut self, options: &[KeyedOption]) -> Vec<String> {
        self.selected = options.to_vec();
        self.values = options.iter().map(|o| o.key.clone()).collect();
        self.values.clone()
    }

    pub fn selected(&self) -> &[KeyedOption] {
        &self.selected
    }

    fn refresh_selection(&mut self) {
        self.selected = self
            .values
            .iter()
            .filter_map(|key| self.options.iter().find(|o| &o.key == key).cloned())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<SearchableOption> {
        vec![
            SearchableOption::new(1, "Kilogram"),
            SearchableOption::new(2, "Litre"),
            SearchableOption::new(3, "Piece"),
        ]
    }

    #[test]
    fn test_select_emits_value_not_title() {
        let mut select = AsyncSearchSelect::new("Unit");
        let ticket = select.set_search("");
        assert!(select.apply_options(&ticket, options()));

        let chosen = select.options()[1].clone();
        assert_eq!(select.select(Some(&chosen)), Some(2));
        assert_eq!(select.selected().unwrap().title, "Litre");
        assert_eq!(select.select(None), None);
    }

    #[test]
    fn test_external_value_outside_options_shows_empty() {
        let mut select = AsyncSearchSelect::new("Unit");
        let ticket = select.set_search("");
        select.apply_options(&ticket, options());

        select.set_value(Some(3));
        assert_eq!(select.selected().unwrap().title, "Piece");

        select.set_value(Some(99));
        assert!(select.selected().is_none());
        assert_eq!(select.value(), Some(99));
    }

    #[test]
    fn test_new_options_rederive_selection() {
        let mut select = AsyncSearchSelect::new("Unit");
        select.set_value(Some(2));
        assert!(select.selected().is_none());

        let ticket = select.set_search("li");
        select.apply_options(&ticket, options());
        assert_eq!(select.selected().unwrap().value, 2);

        let ticket = select.set_search("kil");
        select.apply_options(&ticket, vec![SearchableOption::new(1, "Kilogram")]);
        assert!(select.selected().is_none());
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut select = AsyncSearchSelect::new("Unit");
        let first = select.set_search("w");
        let second = select.set_search("wid");
        assert_eq!(select.term(), Some("wid"));

        assert!(select.apply_options(&second, vec![SearchableOption::new(5, "Widget")]));
        assert!(!select.apply_options(&first, options()));

        assert_eq!(select.options().len(), 1);
        assert!(!select.is_loading());
    }

    #[test]
    fn test_failed_search_keeps_options() {
        let mut select = AsyncSearchSelect::new("Unit");
        let ticket = select.set_search("");
        select.apply_options(&ticket, options());

        let ticket = select.set_search("x");
        assert!(select.is_loading());
        select.search_failed(&ticket);

        assert!(!select.is_loading());
        assert_eq!(select.options().len(), 3);
    }

    #[test]
    fn test_placeholder_text() {
        let mut select = AsyncSearchSelect::new("Unit");
        assert_eq!(select.placeholder_text(), Some(NO_OPTIONS_TEXT));
        let ticket = select.set_search("a");
        assert_eq!(select.placeholder_text(), Some(LOADING_TEXT));
        select.apply_options(&ticket, options());
        assert_eq!(select.placeholder_text(), None);
    }

    #[test]
    fn test_multi_select_emits_ids() {
        let mut select = MultiSearchSelect::new("Organizations");
        let ticket = select.set_search("");
        select.apply_options(&ticket, options());

        let chosen = vec![select.options()[0].clone(), select.options()[2].clone()];
        assert_eq!(select.select(&chosen), vec![1, 3]);
        assert_eq!(select.add(&SearchableOption::new(2, "Litre")), vec![1, 3, 2]);
        assert_eq!(select.add(&SearchableOption::new(2, "Litre")), vec![1, 3, 2]);
        assert_eq!(select.remove(1), vec![3, 2]);
    }

    #[test]
    fn test_multi_select_drops_missing_values_from_display() {
        let mut select = MultiSearchSelect::new("Organizations");
        let ticket = select.set_search("");
        select.apply_options(&ticket, options());

        select.set_values(vec![3, 42, 1]);
        let titles: Vec<&str> = select.selected().iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Piece", "Kilogram"]);
        assert_eq!(select.values(), &[3, 42, 1]);
    }

    #[test]
    fn test_static_multiple_select() {
        let mut select = MultipleSelect::new(
            "Type",
            vec![
                KeyedOption::new("product_materials", "Product materials"),
                KeyedOption::new("service", "Service"),
            ],
        );
        select.set_values(vec!["service".to_string(), "unknown".to_string()]);
        assert_eq!(select.selected().len(), 1);

        let all = vec![KeyedOption::new("service", "Service")];
        assert_eq!(select.select(&all), vec!["service".to_string()]);
    }
}
