use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Highlight,
    Note,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Highlight => "highlight",
            EntryKind::Note => "note",
        }
    }
}

/// Position of an entry inside its source, in device locations or pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationRef {
    Point { value: u32 },
    Range { min: u32, max: u32 },
    /// Kept for display; never contains or is contained by anything.
    Unresolved { raw: String },
}

impl LocationRef {
    pub fn contains(&self, other: &LocationRef) -> bool {
        match (self, other) {
            (LocationRef::Range { min, max }, LocationRef::Point { value }) => {
                min <= value && value <= max
            }
            _ => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            LocationRef::Point { value } => value.to_string(),
            LocationRef::Range { min, max } if min == max => min.to_string(),
            LocationRef::Range { min, max } => format!("{min}-{max}"),
            LocationRef::Unresolved { raw } => raw.clone(),
        }
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClippingEntry {
    pub entry_id: String,
    pub title: String,
    pub kind: EntryKind,
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<NaiveDateTime>,
    pub location: Option<LocationRef>,
    pub page: Option<String>,
    pub content: String,
    /// Notes attached by association; only ever populated on highlights.
    pub notes: Vec<ClippingEntry>,
}

impl ClippingEntry {
    pub fn has_position(&self) -> bool {
        self.location.is_some() || self.page.is_some()
    }

    pub fn citation(&self) -> String {
        let mut parts = Vec::<String>::new();
        if let Some(page) = &self.page {
            parts.push(format!("page {page}"));
        }
        match &self.location {
            Some(location) if self.page.as_deref() != Some(location.label().as_str()) => {
                parts.push(format!("location {location}"));
            }
            _ => {}
        }
        if !self.datetime.is_empty() {
            parts.push(self.datetime.clone());
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleGroup {
    pub title: String,
    pub highlights: Vec<ClippingEntry>,
    pub notes: Vec<ClippingEntry>,
}

impl TitleGroup {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            highlights: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn is_untitled(&self) -> bool {
        self.title.is_empty()
    }

    pub fn attached_note_count(&self) -> usize {
        self.highlights
            .iter()
            .map(|highlight| highlight.notes.len())
            .sum()
    }

    /// Trailing parenthesised author of device titles, e.g. `Dune (Frank Herbert)`.
    pub fn author(&self) -> Option<&str> {
        self.split_author().map(|(_, author)| author)
    }

    pub fn display_title(&self) -> &str {
        self.split_author()
            .map(|(name, _)| name)
            .unwrap_or(self.title.as_str())
    }

    fn split_author(&self) -> Option<(&str, &str)> {
        let inner = self.title.trim_end().strip_suffix(')')?;
        let open = inner.rfind('(')?;
        let name = inner[..open].trim();
        let author = inner[open + 1..].trim();
        if name.is_empty() || author.is_empty() {
            return None;
        }
        Some((name, author))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub split_mode: String,
    pub raw_entries: usize,
    pub parsed_entries: usize,
    pub dropped_entries: usize,
    pub highlights: usize,
    pub notes: usize,
    pub unresolved_locations: usize,
    pub title_groups: usize,
    pub attached_notes: usize,
    pub loose_notes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub stats: ExtractionStats,
    pub groups: Vec<TitleGroup>,
}
