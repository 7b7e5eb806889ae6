use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dataclean: snapshot, restore and reset Docker Compose data volumes.
///
/// For local development and testing only. Destructive commands
/// (restore, reset, delete) require --force or --dry-run.
#[derive(Parser, Debug)]
#[command(name = "dataclean", version, about = "Snapshot and reset Docker Compose data volumes")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Config file (default: ./.dataclean.yaml or ./.dataclean.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root holding the compose file
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Compose project name (default: base name of the project root)
    #[arg(long, global = true)]
    pub project_name: Option<String>,

    /// Preview changes without executing
    #[arg(long, global = true, default_value_t = false)]
    pub dry_run: bool,

    /// Skip confirmation for destructive operations
    #[arg(short, long, global = true, default_value_t = false)]
    pub force: bool,

    /// Minimal output (warnings and errors only)
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct VolumeFilter {
    /// Only these volume references (repeatable)
    #[arg(long)]
    pub include: Vec<String>,
    /// Skip these volume references (repeatable, added to config excludes)
    #[arg(long)]
    pub exclude: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Show compose file, project name and snapshot-capable volumes
    Detect {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Create a snapshot of all detected volumes
    ///
    /// Examples:
    ///   dataclean snapshot                      # snapshot-2024-01-15-143052
    ///   dataclean snapshot before-migration -t release -t v1.0
    ///   dataclean snapshot --meta branch=main --exclude cache_data
    Snapshot {
        /// Snapshot name (default: snapshot-YYYY-MM-DD-HHMMSS)
        name: Option<String>,
        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Metadata entry key=value (repeatable)
        #[arg(long = "meta")]
        meta: Vec<String>,
        #[command(flatten)]
        filter: VolumeFilter,
    },
    /// Restore volumes from a snapshot (destructive)
    Restore { name: String },
    /// Wipe all detected volumes (destructive)
    Reset {
        #[command(flatten)]
        filter: VolumeFilter,
    },
    /// List snapshots, newest first
    List {
        /// Only snapshots carrying this tag
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show one snapshot record
    Show {
        name: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete a snapshot (destructive; missing snapshots are not an error)
    Delete { name: String },
    /// Tag operations
    Tag {
        #[command(subcommand)]
        op: TagCmd,
    },
    /// Set (or with empty text, clear) a snapshot's description
    Describe { name: String, text: String },
    /// Set metadata entries key=value on a snapshot (merged with existing keys)
    Annotate {
        name: String,
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Delete snapshots older than retention_days (automatic _pre-* backups are kept)
    Cleanup {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Report live volume sizes and snapshot storage
    Size {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the effective configuration to .dataclean.yaml
    InitConfig {
        /// Output file (default: <project-dir>/.dataclean.yaml)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCmd {
    /// Add a tag (no-op if present)
    Add { name: String, tag: String },
    /// Remove a tag
    Remove { name: String, tag: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Cli as Parser>::parse()
    }
}
