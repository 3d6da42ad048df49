//! Clippings extraction: split the export into entries, parse each entry's
//! heading, group by title, then attach notes to the highlight that spans them.
//!
//! Every stage consumes the previous stage's full output. Malformed entries are
//! dropped or kept with an unusable location; the input itself never fails a run.

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::SplitMode;
use crate::model::{EntryKind, Extraction, ExtractionStats, LocationRef};

mod associate;
mod group;
mod parse;
mod split;

use associate::*;
use group::*;
use parse::*;
use split::*;

pub fn process(document: &str, requested_mode: SplitMode) -> Result<Extraction> {
    let parser = EntryParser::new()?;
    let mode = resolve_split_mode(document, requested_mode);

    let split = split_entries(document, mode);
    let mut entries = Vec::with_capacity(split.entries.len());
    for (index, raw) in split.entries.iter().enumerate() {
        match parser.parse(raw) {
            Some(entry) => entries.push(entry),
            None => debug!(index, "dropping entry without a body"),
        }
    }

    // Blocks the splitter dropped still count as raw entries that did not parse.
    let raw_entries = split.entries.len() + split.dropped_blocks;
    let mut stats = ExtractionStats {
        split_mode: mode.as_str().to_string(),
        raw_entries,
        parsed_entries: entries.len(),
        dropped_entries: raw_entries - entries.len(),
        ..ExtractionStats::default()
    };
    for entry in &entries {
        match entry.kind {
            EntryKind::Highlight => stats.highlights += 1,
            EntryKind::Note => stats.notes += 1,
        }
        if matches!(entry.location, Some(LocationRef::Unresolved { .. })) {
            stats.unresolved_locations += 1;
        }
    }

    let groups = associate(group_by_title(entries));

    stats.title_groups = groups.len();
    stats.attached_notes = groups.iter().map(|group| group.attached_note_count()).sum();
    stats.loose_notes = groups.iter().map(|group| group.notes.len()).sum();

    info!(
        split_mode = %stats.split_mode,
        raw_entries = stats.raw_entries,
        parsed_entries = stats.parsed_entries,
        dropped_entries = stats.dropped_entries,
        title_groups = stats.title_groups,
        attached_notes = stats.attached_notes,
        loose_notes = stats.loose_notes,
        "clippings extracted"
    );

    Ok(Extraction { stats, groups })
}
