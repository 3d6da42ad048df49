use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::TitlesArgs;
use crate::commands::load_extraction;
use crate::model::TitleGroup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct TitleSummary {
    title: String,
    author: Option<String>,
    highlights: usize,
    attached_notes: usize,
    loose_notes: usize,
}

pub fn run(args: TitlesArgs) -> Result<()> {
    let extraction = load_extraction(&args.input)?;
    let summaries = summarize(&extraction.groups);

    info!(titles = summaries.len(), "listing titles");

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &summaries)
            .context("failed to serialize title summary json")?;
        writeln!(output)?;
    } else {
        for summary in &summaries {
            writeln!(
                output,
                "{}\thighlights={}\tattached_notes={}\tloose_notes={}",
                summary.title, summary.highlights, summary.attached_notes, summary.loose_notes
            )?;
        }
    }

    output.flush()?;
    Ok(())
}

fn summarize(groups: &[TitleGroup]) -> Vec<TitleSummary> {
    groups
        .iter()
        .filter(|group| !group.is_untitled())
        .map(|group| TitleSummary {
            title: group.title.clone(),
            author: group.author().map(ToOwned::to_owned),
            highlights: group.highlights.len(),
            attached_notes: group.attached_note_count(),
            loose_notes: group.notes.len(),
        })
        .collect()
}
