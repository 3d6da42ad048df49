use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use super::split::RawEntry;
use crate::model::{ClippingEntry, EntryKind, LocationRef};
use crate::util::short_digest;

/// English device timestamp layouts, newest firmware first.
const ADDED_AT_FORMATS: &[&str] = &[
    "%A, %d %B %Y %H:%M:%S",
    "%A, %B %d, %Y %I:%M:%S %p",
    "%A, %B %d, %Y, %I:%M %p",
];

#[derive(Default)]
struct PositionTokens {
    location: Option<String>,
    page: Option<String>,
}

pub(crate) struct EntryParser {
    highlight_regex: Regex,
    edge_regex: Regex,
    added_on_regex: Regex,
}

impl EntryParser {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            highlight_regex: Regex::new(r"(?i)\bhighlight\b")
                .context("failed to compile highlight regex")?,
            edge_regex: Regex::new(r"^[\s-]+|[\s-]+$")
                .context("failed to compile metadata edge regex")?,
            added_on_regex: Regex::new(r"(?i)\badded on\b(.*)$")
                .context("failed to compile added-on regex")?,
        })
    }

    pub(crate) fn parse(&self, raw: &RawEntry) -> Option<ClippingEntry> {
        let content = raw
            .body_lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>()
            .join(" ");
        if content.is_empty() {
            return None;
        }

        let title = raw
            .title_line
            .as_deref()
            .map(clean_title)
            .unwrap_or_default();
        let metadata = raw.metadata_line.as_deref().unwrap_or("");
        let segments = metadata.split('|').collect::<Vec<&str>>();

        let kind = if self.highlight_regex.is_match(metadata) {
            EntryKind::Highlight
        } else {
            EntryKind::Note
        };

        let position = self.scan_position(&segments);
        let datetime = self.extract_datetime(&segments);
        let added_at = parse_added_at(&datetime);

        // Page stands in for location when the device only recorded a page.
        let location = position
            .location
            .as_deref()
            .or(position.page.as_deref())
            .map(|value| parse_location(kind, value));

        if let Some(LocationRef::Unresolved { raw }) = &location {
            debug!(title = %title, raw = %raw, "location is not numeric; entry stays unmatched");
        }

        let location_label = location
            .as_ref()
            .map(LocationRef::label)
            .unwrap_or_default();
        let entry_id = short_digest(&[
            title.as_str(),
            kind.as_str(),
            location_label.as_str(),
            datetime.as_str(),
            content.as_str(),
        ]);

        Some(ClippingEntry {
            entry_id,
            title,
            kind,
            datetime,
            added_at,
            location,
            page: position.page,
            content,
            notes: Vec::new(),
        })
    }

    fn scan_position(&self, segments: &[&str]) -> PositionTokens {
        // Some firmware splits "location" and its number across the first two segments.
        let scan_text = if segments.len() > 2 {
            format!("{} {}", segments[0], segments[1])
        } else {
            segments.first().copied().unwrap_or("").to_string()
        };

        let cleaned = self.edge_regex.replace_all(&scan_text, "");
        let tokens = cleaned.split_whitespace().collect::<Vec<&str>>();

        let mut position = PositionTokens::default();
        for pair in tokens.windows(2) {
            match pair[0].to_ascii_lowercase().as_str() {
                "location" | "loc" | "loc." => position.location = Some(pair[1].to_string()),
                "page" => position.page = Some(pair[1].to_string()),
                _ => {}
            }
        }

        position
    }

    fn extract_datetime(&self, segments: &[&str]) -> String {
        let Some(last) = segments.last() else {
            return String::new();
        };

        if let Some(captures) = self.added_on_regex.captures(last) {
            return captures
                .get(1)
                .map(|value| value.as_str().trim().to_string())
                .unwrap_or_default();
        }

        // A lone segment is the position segment, not a timestamp.
        if segments.len() < 2 {
            return String::new();
        }

        last.trim().to_string()
    }
}

fn clean_title(line: &str) -> String {
    line.trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_location(kind: EntryKind, value: &str) -> LocationRef {
    match kind {
        EntryKind::Highlight => parse_range(value),
        EntryKind::Note => parse_point(value),
    }
}

fn parse_range(value: &str) -> LocationRef {
    let (start, end) = value.split_once('-').unwrap_or((value, value));
    let (start, end) = (start.trim(), end.trim());

    let (Ok(min), Ok(max)) = (start.parse::<u32>(), end.parse::<u32>()) else {
        return LocationRef::Unresolved {
            raw: value.to_string(),
        };
    };

    let max = expand_abbreviated_max(start, end, min, max);
    if min > max {
        return LocationRef::Unresolved {
            raw: value.to_string(),
        };
    }

    LocationRef::Range { min, max }
}

/// Older exports shorten range ends, e.g. `1234-37` for 1234-1237.
fn expand_abbreviated_max(start: &str, end: &str, min: u32, max: u32) -> u32 {
    if max >= min || end.len() >= start.len() {
        return max;
    }

    let prefix = &start[..start.len() - end.len()];
    format!("{prefix}{end}")
        .parse::<u32>()
        .ok()
        .filter(|expanded| *expanded >= min)
        .unwrap_or(max)
}

fn parse_point(value: &str) -> LocationRef {
    let digits = value
        .trim()
        .chars()
        .take_while(|character| character.is_ascii_digit())
        .collect::<String>();

    match digits.parse::<u32>() {
        Ok(value) => LocationRef::Point { value },
        Err(_) => LocationRef::Unresolved {
            raw: value.to_string(),
        },
    }
}

fn parse_added_at(datetime: &str) -> Option<NaiveDateTime> {
    if datetime.is_empty() {
        return None;
    }

    ADDED_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(datetime, format).ok())
}
