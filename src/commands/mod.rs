pub mod export;
pub mod extract;
pub mod titles;

use anyhow::Result;
use tracing::info;

use crate::cli::InputArgs;
use crate::model::Extraction;
use crate::pipeline;
use crate::util::read_document;

/// Reads the clippings file and runs the full extraction over it.
fn load_extraction(args: &InputArgs) -> Result<Extraction> {
    info!(
        input = %args.input.display(),
        split_mode = args.split_mode.as_str(),
        "reading clippings"
    );

    let document = read_document(&args.input)?;
    pipeline::process(&document, args.split_mode)
}
