use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "clippings",
    version,
    about = "Extract highlights and notes from e-reader clippings exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Titles(TitlesArgs),
    Export(ExportArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SplitMode {
    /// Divider-separated when a divider line is present, five-line stride otherwise.
    Auto,
    Stride,
    Divider,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Stride => "stride",
            Self::Divider => "divider",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Markdown,
    Json,
    Sqlite,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Clippings export to read (e.g. `My Clippings.txt`).
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = SplitMode::Auto)]
    pub split_mode: SplitMode,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Case-insensitive substring filter on titles.
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, default_value_t = false)]
    pub include_untitled: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TitlesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Exact title to export; every titled group is exported when omitted.
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
    pub format: ExportFormat,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "exports")]
    pub output_dir: PathBuf,
}
