use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ExtractArgs;
use crate::commands::load_extraction;
use crate::model::{ExtractionStats, TitleGroup};

#[derive(Debug, Serialize)]
struct ExtractResponse<'a> {
    source: String,
    title_filter: Option<String>,
    returned: usize,
    stats: &'a ExtractionStats,
    groups: Vec<&'a TitleGroup>,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let extraction = load_extraction(&args.input)?;
    let groups = select_groups(
        &extraction.groups,
        args.title.as_deref(),
        args.include_untitled,
    );

    info!(returned = groups.len(), json = args.json, "rendering clippings");

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        let response = ExtractResponse {
            source: args.input.input.display().to_string(),
            title_filter: args.title.clone(),
            returned: groups.len(),
            stats: &extraction.stats,
            groups,
        };
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize clippings json output")?;
        writeln!(output)?;
    } else {
        write_text_response(&mut output, &groups)?;
    }

    output.flush()?;
    Ok(())
}

pub(crate) fn select_groups<'a>(
    groups: &'a [TitleGroup],
    title_filter: Option<&str>,
    include_untitled: bool,
) -> Vec<&'a TitleGroup> {
    let needle = title_filter
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty());

    groups
        .iter()
        .filter(|group| include_untitled || !group.is_untitled())
        .filter(|group| {
            needle
                .as_deref()
                .map(|needle| group.title.to_lowercase().contains(needle))
                .unwrap_or(true)
        })
        .collect()
}

fn write_text_response<W: Write>(output: &mut W, groups: &[&TitleGroup]) -> Result<()> {
    if groups.is_empty() {
        writeln!(output, "No clippings found.")?;
        return Ok(());
    }

    for group in groups {
        let title = if group.is_untitled() {
            "(untitled)"
        } else {
            group.title.as_str()
        };

        writeln!(output, "{title}")?;
        // Highlights with neither location nor page carry nothing to cite.
        let shown = group
            .highlights
            .iter()
            .filter(|value| value.has_position())
            .collect::<Vec<_>>();
        writeln!(
            output,
            "  highlights={} unplaced={} attached_notes={} loose_notes={}",
            shown.len(),
            group.highlights.len() - shown.len(),
            group.attached_note_count(),
            group.notes.len()
        )?;

        for highlight in shown {
            writeln!(output)?;
            writeln!(output, "  > {}", highlight.content)?;
            writeln!(output, "    ({})", highlight.citation())?;
            for note in &highlight.notes {
                writeln!(output, "    * {}", note.content)?;
            }
        }

        if !group.notes.is_empty() {
            writeln!(output)?;
            writeln!(output, "  Loose notes:")?;
            for note in &group.notes {
                writeln!(output, "    * {} ({})", note.content, note.citation())?;
            }
        }

        writeln!(output)?;
    }

    Ok(())
}
