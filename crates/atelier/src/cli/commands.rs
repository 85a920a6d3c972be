//! CLI command definitions.

use atelier_core::{AssetId, OutputFormat, VersionSelector};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Atelier - versioned asset store with cached image renditions
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(about = "Versioned asset store with cached image renditions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (bundled defaults are used for anything it omits)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an asset from a file
    Upload {
        /// File to upload
        file: PathBuf,

        /// Asset title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        /// Asset description
        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mimetype: Option<String>,
    },

    /// Create one asset per file, reporting each outcome
    BulkUpload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Comma-separated tags applied to every asset
        #[arg(long)]
        tags: Option<String>,
    },

    /// Upload a new version of an asset
    AddVersion {
        /// Asset id
        id: AssetId,

        /// File holding the new contents
        file: PathBuf,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mimetype: Option<String>,
    },

    /// Show an asset
    Show {
        /// Asset id
        id: AssetId,
    },

    /// Search assets, newest first
    List {
        /// Case-insensitive text matched against title and description
        #[arg(long)]
        text: Option<String>,

        /// Required tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Exact MIME type
        #[arg(long)]
        mimetype: Option<String>,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Items per page
        #[arg(long, default_value = "20")]
        size: u32,
    },

    /// List an asset's versions
    Versions {
        /// Asset id
        id: AssetId,
    },

    /// Write a version's bytes to a file
    Download {
        /// Asset id
        id: AssetId,

        /// Version number or "latest"
        #[arg(long, default_value = "latest")]
        version: VersionSelector,

        /// Destination (defaults to the uploaded filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Derive a resized or re-encoded rendition
    Transform {
        /// Asset id
        id: AssetId,

        /// Version number or "latest"
        #[arg(long, default_value = "latest")]
        version: VersionSelector,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Crop to fill the exact box
        #[arg(long)]
        crop: bool,

        /// Output format (defaults to the source format)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Encoder quality, 1-100
        #[arg(long, default_value = "80")]
        quality: u8,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a preview of the current version
    Preview {
        /// Asset id
        id: AssetId,

        /// Preview width
        #[arg(long)]
        width: Option<u32>,

        /// Preview height
        #[arg(long)]
        height: Option<u32>,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List tags in use with asset counts
    Tags {
        /// Case-insensitive substring filter
        #[arg(long)]
        text: Option<String>,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Items per page
        #[arg(long, default_value = "50")]
        size: u32,
    },

    /// Replace an asset's tags
    SetTags {
        /// Asset id
        id: AssetId,

        /// Comma-separated tags (empty clears them)
        tags: String,
    },

    /// Edit an asset's title or description
    Edit {
        /// Asset id
        id: AssetId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },

    /// Show blob storage usage
    Usage,
}
