use tracing::debug;

use crate::cli::SplitMode;

pub(crate) const ENTRY_DIVIDER: &str = "==========";

const STRIDE_LINES: usize = 5;
const TITLE_OFFSET: usize = 0;
const METADATA_OFFSET: usize = 1;
const BODY_OFFSET: usize = 3;

/// One entry's lines, mapped onto their fixed offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawEntry {
    pub(crate) title_line: Option<String>,
    pub(crate) metadata_line: Option<String>,
    pub(crate) body_lines: Vec<String>,
}

/// Entries with a body, plus the count of non-blank blocks that had none.
#[derive(Debug, Default)]
pub(crate) struct SplitEntries {
    pub(crate) entries: Vec<RawEntry>,
    pub(crate) dropped_blocks: usize,
}

pub(crate) fn resolve_split_mode(document: &str, requested: SplitMode) -> SplitMode {
    match requested {
        SplitMode::Auto if document.lines().any(is_divider_line) => SplitMode::Divider,
        SplitMode::Auto => SplitMode::Stride,
        explicit => explicit,
    }
}

/// `mode` must already be resolved; `Auto` is treated as `Stride`.
pub(crate) fn split_entries(document: &str, mode: SplitMode) -> SplitEntries {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    let lines = document.lines().collect::<Vec<&str>>();

    match mode {
        SplitMode::Divider => split_on_divider(&lines),
        SplitMode::Stride | SplitMode::Auto => split_on_stride(&lines),
    }
}

fn split_on_stride(lines: &[&str]) -> SplitEntries {
    let mut split = SplitEntries::default();

    for block in lines.chunks(STRIDE_LINES) {
        let body = block
            .get(BODY_OFFSET)
            .map(|line| line.trim())
            .filter(|line| !line.is_empty());

        match body {
            Some(body) => split.entries.push(RawEntry {
                title_line: block.get(TITLE_OFFSET).map(|line| line.to_string()),
                metadata_line: block.get(METADATA_OFFSET).map(|line| line.to_string()),
                body_lines: vec![body.to_string()],
            }),
            None => record_dropped_block(&mut split, block),
        }
    }

    split
}

fn split_on_divider(lines: &[&str]) -> SplitEntries {
    let mut split = SplitEntries::default();
    let mut block = Vec::<&str>::new();

    for &line in lines {
        if is_divider_line(line) {
            push_divider_block(&mut split, &block);
            block.clear();
            continue;
        }
        block.push(line);
    }
    push_divider_block(&mut split, &block);

    split
}

fn push_divider_block(split: &mut SplitEntries, block: &[&str]) {
    let body_lines = block
        .iter()
        .skip(BODY_OFFSET)
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();

    if body_lines.is_empty() {
        record_dropped_block(split, block);
        return;
    }

    split.entries.push(RawEntry {
        title_line: block.get(TITLE_OFFSET).map(|line| line.to_string()),
        metadata_line: block.get(METADATA_OFFSET).map(|line| line.to_string()),
        body_lines,
    });
}

/// Wholly blank blocks (trailing padding) are not counted as dropped entries.
fn record_dropped_block(split: &mut SplitEntries, block: &[&str]) {
    if block.iter().all(|line| line.trim().is_empty()) {
        return;
    }

    split.dropped_blocks += 1;
    debug!(
        title = block.get(TITLE_OFFSET).map(|line| line.trim()).unwrap_or(""),
        "dropping block without a body"
    );
}

fn is_divider_line(line: &str) -> bool {
    line.trim() == ENTRY_DIVIDER
}
