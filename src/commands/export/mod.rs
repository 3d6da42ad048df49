use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::cli::{ExportArgs, ExportFormat};
use crate::commands::load_extraction;
use crate::model::TitleGroup;
use crate::util::{now_utc_string, slugify, write_json_pretty, write_text_file};

mod markdown;
mod sqlite;
#[cfg(test)]
mod tests;

use markdown::*;
use sqlite::*;

const EXPORT_VERSION: u32 = 1;
const ALL_TITLES_STEM: &str = "clippings";

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    export_version: u32,
    generated_at: String,
    source: String,
    title_count: usize,
    groups: &'a [&'a TitleGroup],
}

pub fn run(args: ExportArgs) -> Result<()> {
    let extraction = load_extraction(&args.input)?;
    let groups = select_export_groups(&extraction.groups, args.title.as_deref())?;
    let output_path = args.output.clone().unwrap_or_else(|| {
        default_output_path(&args.output_dir, args.title.as_deref(), args.format)
    });
    let source = args.input.input.display().to_string();

    match args.format {
        ExportFormat::Markdown => {
            write_text_file(&output_path, &render_markdown(&groups))?;
        }
        ExportFormat::Json => {
            let document = ExportDocument {
                export_version: EXPORT_VERSION,
                generated_at: now_utc_string(),
                source,
                title_count: groups.len(),
                groups: &groups,
            };
            write_json_pretty(&output_path, &document)?;
        }
        ExportFormat::Sqlite => {
            let counts = write_sqlite(&output_path, &groups, &source)?;
            info!(
                titles = counts.titles,
                entries = counts.entries,
                "populated sqlite export"
            );
        }
    }

    info!(
        path = %output_path.display(),
        format = args.format.as_str(),
        titles = groups.len(),
        "wrote export"
    );

    Ok(())
}

fn select_export_groups<'a>(
    groups: &'a [TitleGroup],
    title: Option<&str>,
) -> Result<Vec<&'a TitleGroup>> {
    if let Some(title) = title {
        let group = groups
            .iter()
            .find(|group| group.title == title)
            .with_context(|| format!("no clippings found for title: {title}"))?;
        return Ok(vec![group]);
    }

    let selected = groups
        .iter()
        .filter(|group| !group.is_untitled())
        .collect::<Vec<&TitleGroup>>();
    if selected.is_empty() {
        bail!("no titled clippings to export");
    }

    Ok(selected)
}

fn default_output_path(output_dir: &Path, title: Option<&str>, format: ExportFormat) -> PathBuf {
    let stem = title
        .map(slugify)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| ALL_TITLES_STEM.to_string());

    output_dir.join(format!("{stem}.{}", format.extension()))
}
