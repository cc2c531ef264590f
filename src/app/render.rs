//! Terminal, CSV and JSON renditions of the admin views.

use crate::core::columns::{render_cell, Cell, Chip, Skin, Tone, PROBLEM_COLUMNS};
use crate::core::entities::EntityKind;
use crate::core::paginated_table::ProblemsTable;
use crate::core::schema::FieldErrors;
use crate::domain::model::{Problem, SearchableOption, ServerPage};
use crate::utils::error::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell as TableCell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Primary => Color::Blue,
        Tone::Info => Color::Cyan,
        Tone::Success => Color::Green,
        Tone::Warning => Color::Yellow,
        Tone::Error => Color::Red,
    }
}

fn chip_label(chip: &Chip) -> String {
    if chip.rounded {
        format!("({})", chip.label)
    } else {
        chip.label.clone()
    }
}

fn styled(cell: TableCell, tone: Tone, skin: Skin) -> TableCell {
    let cell = cell.fg(tone_color(tone));
    match skin {
        Skin::Filled => cell.add_attribute(Attribute::Bold),
        Skin::Light => cell,
    }
}

fn table_cell(cell: &Cell) -> TableCell {
    match cell {
        Cell::Text(text) => TableCell::new(text),
        Cell::Badge { count, tone } => TableCell::new(count)
            .fg(tone_color(*tone))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
        Cell::Chips(chips) => {
            let text = chips.iter().map(chip_label).collect::<Vec<_>>().join(" ");
            // A cell has one colour; mixed chips stay plain.
            match chips.first() {
                Some(first) if chips.iter().all(|c| c.tone == first.tone) => {
                    styled(TableCell::new(text), first.tone, first.skin)
                }
                _ => TableCell::new(text),
            }
        }
    }
}

fn header_cell(text: &str) -> TableCell {
    TableCell::new(text).add_attribute(Attribute::Bold)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

/// Grid of the current problems page, or the overlay text when there is
/// nothing to show.
pub fn problems_grid(table: &ProblemsTable) -> Table {
    let mut grid = Table::new();
    apply_table_style(&mut grid);
    grid.set_header(PROBLEM_COLUMNS.iter().map(|c| header_cell(c.header)));

    if let Some(overlay) = table.overlay() {
        grid.add_row(vec![TableCell::new(overlay).fg(Color::DarkGrey)]);
        return grid;
    }

    for problem in table.rows() {
        grid.add_row(
            PROBLEM_COLUMNS
                .iter()
                .map(|column| table_cell(&render_cell(problem, column.field))),
        );
    }
    grid
}

pub fn page_footer(table: &ProblemsTable) -> String {
    let state = table.state();
    format!(
        "Page {} of {} · {} rows · {} per page",
        state.page,
        table.pages_count().max(1),
        table.row_count(),
        state.page_size
    )
}

pub fn write_problems_csv<W: Write>(table: &ProblemsTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(PROBLEM_COLUMNS.iter().map(|c| c.header))?;
    for problem in table.rows() {
        writer.write_record(
            PROBLEM_COLUMNS
                .iter()
                .map(|column| render_cell(problem, column.field).plain_text()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write, T: serde::Serialize + ?Sized>(value: &T, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_problems<W: Write>(table: &ProblemsTable, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{}", problems_grid(table))?;
            writeln!(out, "{}", page_footer(table))?;
            Ok(())
        }
        OutputFormat::Csv => write_problems_csv(table, out),
        OutputFormat::Json => match table.page() {
            Some(page) => write_json(page, out),
            None => {
                let state = table.state();
                write_json(&ServerPage::<Problem>::empty(state.page, state.page_size), out)
            }
        },
    }
}

pub fn resources_table() -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Label"),
        header_cell("Endpoint"),
    ]);
    for kind in EntityKind::ALL {
        table.add_row(vec![
            TableCell::new(kind.name()).fg(Color::Cyan),
            TableCell::new(kind.label()),
            TableCell::new(format!("/{}/", kind.resource())),
        ]);
    }
    table
}

pub fn options_table(options: &[SearchableOption], empty_text: &str) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("ID"), header_cell("Name")]);
    if options.is_empty() {
        table.add_row(vec![TableCell::new("-"), TableCell::new(empty_text).fg(Color::DarkGrey)]);
    }
    for option in options {
        table.add_row(vec![
            TableCell::new(option.value).set_alignment(CellAlignment::Right),
            TableCell::new(&option.title),
        ]);
    }
    table
}

pub fn write_options_csv<W: Write>(options: &[SearchableOption], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["ID", "Name"])?;
    for option in options {
        writer.write_record([option.value.to_string(), option.title.clone()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_options<W: Write>(
    options: &[SearchableOption],
    empty_text: &str,
    format: OutputFormat,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{}", options_table(options, empty_text))?;
            Ok(())
        }
        OutputFormat::Csv => write_options_csv(options, out),
        OutputFormat::Json => write_json(options, out),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Two-column field/value view of one record.
pub fn record_table(record: &Value) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    match record {
        Value::Object(map) => {
            for (field, value) in map {
                table.add_row(vec![TableCell::new(field).fg(Color::Cyan), TableCell::new(scalar_text(value))]);
            }
        }
        other => {
            table.add_row(vec![TableCell::new("-"), TableCell::new(scalar_text(other))]);
        }
    }
    table
}

pub fn field_errors_table(errors: &FieldErrors) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Field"), header_cell("Error")]);
    for (field, message) in errors.iter() {
        table.add_row(vec![
            TableCell::new(field).fg(Color::Yellow),
            TableCell::new(message).fg(Color::Red),
        ]);
    }
    table
}

/// One `field,value` line per top-level field.
pub fn write_record_csv<W: Write>(record: &Value, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Field", "Value"])?;
    match record {
        Value::Object(map) => {
            for (field, value) in map {
                writer.write_record([field.clone(), scalar_text(value)])?;
            }
        }
        other => writer.write_record([String::new(), scalar_text(other)])?,
    }
    writer.flush()?;
    Ok(())
}

pub fn write_record<W: Write>(record: &Value, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(record, out),
        OutputFormat::Csv => write_record_csv(record, out),
        OutputFormat::Table => {
            writeln!(out, "{}", record_table(record))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Tag, UserInfo};
    use serde_json::json;

    fn problem(id: i64, title: &str) -> Problem {
        Problem {
            id,
            title: title.to_string(),
            difficulty: 1,
            difficulty_title: "Basic".to_string(),
            solved: 4,
            not_solved: 2,
            attempts_count: 6,
            has_checker: false,
            tags: vec![Tag { id: 1, name: "Math".to_string() }],
            has_solution: false,
            solution_kepcoin_value: 0,
            likes_count: 3,
            dislikes_count: 0,
            hidden: false,
            author_username: None,
            user_info: UserInfo::default(),
        }
    }

    fn loaded_table(rows: Vec<Problem>, total: u64) -> ProblemsTable {
        let mut table = ProblemsTable::new(vec![20], 20).unwrap();
        let ticket = table.refresh();
        table.complete(
            &ticket,
            Ok(ServerPage {
                count: rows.len() as u64,
                data: rows,
                total,
                page: 1,
                page_size: 20,
                pages_count: 0,
            }),
        );
        table
    }

    #[test]
    fn test_csv_uses_column_headers_and_plain_cells() {
        let table = loaded_table(vec![problem(1, "Widgets, part 1")], 1);
        let mut out = Vec::new();
        write_problems_csv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Title,Tags,Difficulty,Likes,Dislikes,Solved,notSolved")
        );
        assert_eq!(lines.next(), Some("1,\"Widgets, part 1\",Math,Basic,3,0,4,2"));
    }

    #[test]
    fn test_empty_grid_shows_overlay() {
        let table = loaded_table(vec![], 0);
        let grid = problems_grid(&table).to_string();
        assert!(grid.contains("No Data"));
        assert_eq!(page_footer(&table), "Page 1 of 1 · 0 rows · 20 per page");
    }

    #[test]
    fn test_grid_lists_rows() {
        let table = loaded_table(vec![problem(1, "Widgets"), problem(2, "Gadgets")], 45);
        let grid = problems_grid(&table).to_string();
        assert!(grid.contains("Widgets"));
        assert!(grid.contains("Gadgets"));
        assert!(page_footer(&table).starts_with("Page 1 of 3"));
    }

    #[test]
    fn test_record_table_flattens_scalars() {
        let text = record_table(&json!({"name": "Kg", "short_name": null})).to_string();
        assert!(text.contains("Kg"));
        assert!(text.contains("short_name"));
    }

    #[test]
    fn test_record_csv_has_field_value_rows() {
        let mut out = Vec::new();
        write_record(
            &json!({"id": 3, "name": "Kg, net", "parent": null}),
            OutputFormat::Csv,
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Field,Value", "id,3", "name,\"Kg, net\"", "parent,-"]
        );
    }

    #[test]
    fn test_options_csv_lists_id_and_name() {
        let options = vec![
            SearchableOption { value: 1, title: "Nike".to_string() },
            SearchableOption { value: 2, title: "Puma".to_string() },
        ];
        let mut out = Vec::new();
        write_options(&options, "No data", OutputFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "ID,Name\n1,Nike\n2,Puma\n");
        assert!(!text.contains('│'));
    }

    #[test]
    fn test_resources_table_lists_every_kind() {
        let text = resources_table().to_string();
        for kind in EntityKind::ALL {
            assert!(text.contains(kind.name()));
        }
    }
}
