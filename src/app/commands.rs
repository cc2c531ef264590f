//! The operations behind each CLI subcommand. They only need the ports, so
//! tests can drive them against a mock server.

use crate::app::render::{self, OutputFormat};
use crate::config::toml_config::TableSettings;
use crate::core::entities::EntityKind;
use crate::core::entity_form::{EntityForm, SubmitOutcome};
use crate::core::paginated_table::ProblemsTable;
use crate::core::search_select::{run_search, AsyncSearchSelect};
use crate::domain::model::{PaginationState, Problem, ProblemFilters};
use crate::domain::ports::{EntityGateway, Notifier, PageSource};
use crate::utils::error::{AdminError, Result};
use serde_json::Value;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct ProblemsRequest {
    pub page: u32,
    pub page_size: Option<u32>,
    pub title: Option<String>,
    pub difficulty: Option<String>,
    pub has_checker: Option<bool>,
}

/// Fetch one page of problems through a [`ProblemsTable`] and return it.
pub async fn load_problems<S>(
    source: &S,
    settings: &TableSettings,
    request: &ProblemsRequest,
) -> Result<ProblemsTable>
where
    S: PageSource<Row = Problem, Filters = ProblemFilters> + ?Sized,
{
    let mut table = ProblemsTable::new(
        settings.page_size_options.clone(),
        settings.default_page_size,
    )?;

    table.set_title(request.title.as_deref().unwrap_or_default());
    table.set_difficulty(request.difficulty.clone());
    table.set_has_checker(request.has_checker);
    table.set_pagination(PaginationState {
        page: request.page,
        page_size: request.page_size.unwrap_or(settings.default_page_size),
    })?;

    let ticket = table.refresh();
    tracing::info!(
        "📡 Fetching problems page {} (size {})",
        ticket.state.page,
        ticket.state.page_size
    );

    // Nothing was shown before, so a failure is reported instead of kept.
    let page = source.fetch_page(ticket.state, &ticket.filters).await?;
    table.complete(&ticket, Ok(page));
    Ok(table)
}

pub async fn problems<S, W>(
    source: &S,
    settings: &TableSettings,
    request: &ProblemsRequest,
    format: OutputFormat,
    out: W,
) -> Result<()>
where
    S: PageSource<Row = Problem, Filters = ProblemFilters> + ?Sized,
    W: Write,
{
    let table = load_problems(source, settings, request).await?;
    render::write_problems(&table, format, out)
}

pub fn resources<W: Write>(mut out: W) -> Result<()> {
    writeln!(out, "{}", render::resources_table())?;
    Ok(())
}

pub async fn search<G, W>(gateway: &G, kind: EntityKind, term: &str, format: OutputFormat, out: W) -> Result<()>
where
    G: EntityGateway + ?Sized,
    W: Write,
{
    let mut select = AsyncSearchSelect::new(kind.label());
    run_search(&mut select, gateway, kind.resource(), term).await?;

    let empty = select.placeholder_text().unwrap_or_default();
    render::write_options(select.options(), empty, format, out)
}

pub async fn show<G, W>(gateway: &G, kind: EntityKind, id: i64, format: OutputFormat, out: W) -> Result<()>
where
    G: EntityGateway + ?Sized,
    W: Write,
{
    let record = gateway.fetch(kind.resource(), id).await?;
    render::write_record(&record, format, out)
}

/// Parse `field=value`. The value is read as JSON when it is valid JSON
/// (`3`, `true`, `null`, `[1,2]`) and as a plain string otherwise.
pub fn parse_assignment(input: &str) -> Result<(String, Value)> {
    let (field, raw) = input.split_once('=').ok_or_else(|| AdminError::ValidationError {
        message: format!("expected field=value, got '{}'", input),
    })?;

    let field = field.trim();
    if field.is_empty() {
        return Err(AdminError::ValidationError {
            message: format!("missing field name in '{}'", input),
        });
    }

    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

pub async fn create<G, N, W>(
    gateway: &G,
    notifier: &N,
    kind: EntityKind,
    assignments: &[(String, Value)],
    format: OutputFormat,
    out: W,
) -> Result<Value>
where
    G: EntityGateway + ?Sized,
    N: Notifier + ?Sized,
    W: Write,
{
    let mut form = EntityForm::create(kind);
    fill(&mut form, assignments);
    submit(form, gateway, notifier, format, out).await
}

pub async fn update<G, N, W>(
    gateway: &G,
    notifier: &N,
    kind: EntityKind,
    id: i64,
    assignments: &[(String, Value)],
    format: OutputFormat,
    out: W,
) -> Result<Value>
where
    G: EntityGateway + ?Sized,
    N: Notifier + ?Sized,
    W: Write,
{
    let mut form = EntityForm::edit(kind, id);
    form.load(gateway).await?;
    fill(&mut form, assignments);
    submit(form, gateway, notifier, format, out).await
}

fn fill(form: &mut EntityForm, assignments: &[(String, Value)]) {
    for (field, value) in assignments {
        if form.schema().field(field).is_none() {
            tracing::warn!("⚠️ {} has no field '{}', ignoring it", form.kind(), field);
        }
        form.set(field, value.clone());
    }
}

async fn submit<G, N, W>(
    mut form: EntityForm,
    gateway: &G,
    notifier: &N,
    format: OutputFormat,
    mut out: W,
) -> Result<Value>
where
    G: EntityGateway + ?Sized,
    N: Notifier + ?Sized,
    W: Write,
{
    let kind = form.kind();
    let outcome = form
        .submit(gateway, notifier, || {
            tracing::debug!("🔄 {} list is stale after the save", kind.label());
        })
        .await?;

    match outcome {
        SubmitOutcome::Saved(record) => {
            render::write_record(&record, format, &mut out)?;
            Ok(record)
        }
        SubmitOutcome::Invalid(errors) | SubmitOutcome::Rejected(errors) => {
            writeln!(out, "{}", render::field_errors_table(&errors))?;
            Err(AdminError::ValidationError {
                message: errors
                    .first_message()
                    .unwrap_or("the form was rejected")
                    .to_string(),
            })
        }
        // A fresh form never has a submit in flight.
        SubmitOutcome::Busy => Err(AdminError::ValidationError {
            message: format!("a {} submit is already running", kind),
        }),
    }
}
