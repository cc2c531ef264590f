//! Column model of the problems grid and the cosmetic mapping of raw
//! values to chips and badges.

use crate::domain::model::{Problem, Tag};

/// Palette names shared by chips and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Primary,
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skin {
    Filled,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub label: String,
    pub tone: Tone,
    pub skin: Skin,
    pub rounded: bool,
}

impl Chip {
    fn filled(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
            skin: Skin::Filled,
            rounded: false,
        }
    }

    fn light(label: impl Into<String>, tone: Tone, rounded: bool) -> Self {
        Self {
            label: label.into(),
            tone,
            skin: Skin::Light,
            rounded,
        }
    }
}

/// What a single cell renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Chips(Vec<Chip>),
    Badge { count: u64, tone: Tone },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemField {
    Id,
    Title,
    Tags,
    Difficulty,
    Likes,
    Dislikes,
    Solved,
    NotSolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: ProblemField,
    pub header: &'static str,
    pub width: u16,
    pub sortable: bool,
    pub filterable: bool,
}

const fn column(field: ProblemField, header: &'static str, width: u16, sortable: bool) -> Column {
    Column {
        field,
        header,
        width,
        sortable,
        filterable: false,
    }
}

/// Filtering happens on the server, so no column is filterable.
pub const PROBLEM_COLUMNS: [Column; 8] = [
    column(ProblemField::Id, "ID", 70, true),
    column(ProblemField::Title, "Title", 350, true),
    column(ProblemField::Tags, "Tags", 400, false),
    column(ProblemField::Difficulty, "Difficulty", 150, false),
    column(ProblemField::Likes, "Likes", 55, true),
    column(ProblemField::Dislikes, "Dislikes", 150, true),
    column(ProblemField::Solved, "Solved", 100, true),
    column(ProblemField::NotSolved, "notSolved", 100, true),
];

pub const NO_TAGS_LABEL: &str = "not tags";

pub fn tag_tone(name: &str) -> Tone {
    match name {
        "Google" => Tone::Error,
        "IQ" => Tone::Success,
        "Math" => Tone::Info,
        _ => Tone::Primary,
    }
}

pub fn difficulty_tone(title: &str) -> Tone {
    match title {
        "Basic" => Tone::Primary,
        "Medium" => Tone::Info,
        "Hard" => Tone::Warning,
        "Advanced" => Tone::Success,
        _ => Tone::Error,
    }
}

pub fn tag_chips(tags: &[Tag]) -> Vec<Chip> {
    if tags.is_empty() {
        return vec![Chip::light(NO_TAGS_LABEL, Tone::Error, false)];
    }
    tags.iter()
        .map(|tag| Chip::filled(tag.name.clone(), tag_tone(&tag.name)))
        .collect()
}

pub fn render_cell(problem: &Problem, field: ProblemField) -> Cell {
    match field {
        ProblemField::Id => Cell::Text(problem.id.to_string()),
        ProblemField::Title => Cell::Text(problem.title.clone()),
        ProblemField::Tags => Cell::Chips(tag_chips(&problem.tags)),
        ProblemField::Difficulty => Cell::Chips(vec![Chip::filled(
            problem.difficulty_title.clone(),
            difficulty_tone(&problem.difficulty_title),
        )]),
        ProblemField::Likes => Cell::Badge {
            count: problem.likes_count,
            tone: Tone::Success,
        },
        ProblemField::Dislikes => Cell::Badge {
            count: problem.dislikes_count,
            tone: Tone::Error,
        },
        ProblemField::Solved => Cell::Chips(vec![Chip::light(
            problem.solved.to_string(),
            Tone::Success,
            true,
        )]),
        ProblemField::NotSolved => Cell::Chips(vec![Chip::light(
            problem.not_solved.to_string(),
            Tone::Error,
            true,
        )]),
    }
}

impl Cell {
    /// Plain-text rendition, used for CSV export.
    pub fn plain_text(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Chips(chips) => chips
                .iter()
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>()
                .join("|"),
            Cell::Badge { count, .. } => count.to_string(),
        }
    }
}
