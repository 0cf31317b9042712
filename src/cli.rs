use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atchsplit")]
#[command(about = "Split a PDF into individually named single-page PDFs")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PrefixArgs {
    /// Preset year to prefix file names with (see ATCH_YEAR_TOKENS)
    #[arg(short, long, conflicts_with = "custom_year")]
    pub year: Option<String>,

    /// Any other prefix value; an empty value means no prefix
    #[arg(long)]
    pub custom_year: Option<String>,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct NameSource {
    /// Page names in page order, comma-separated and used exactly as given
    #[arg(short, long, value_delimiter = ',')]
    pub names: Option<Vec<String>>,

    /// Names file to read page names from (rows matched by position)
    #[arg(short, long)]
    pub sidecar: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server holding one naming session
    Mcp,

    /// Display file name, page count and size
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Write page previews as PNG images
    Preview {
        /// PDF file to render
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Page ranges (e.g., "1-5,10,15-end")
        #[arg(short, long, default_value = "1-end")]
        pages: String,
    },

    /// Split the PDF into one named file per page and save the names file
    #[command(alias = "process")]
    Split {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        names: NameSource,

        #[command(flatten)]
        prefix: PrefixArgs,
    },

    /// Save page names to the names file next to the PDF
    SaveNames {
        /// PDF file the names belong to
        path: PathBuf,

        /// Page names in page order, comma-separated and used exactly as given
        #[arg(short, long, value_delimiter = ',', required = true)]
        names: Vec<String>,

        #[command(flatten)]
        prefix: PrefixArgs,
    },

    /// Load a names file and print the committed names
    ShowNames {
        /// PDF file the names belong to
        path: PathBuf,

        /// Names file (defaults to the one next to the PDF)
        #[arg(short, long)]
        sidecar: Option<PathBuf>,

        #[command(flatten)]
        prefix: PrefixArgs,
    },
}
