//! Gistpane - A two-pane terminal markdown editor with live preview.
//!
//! # Usage
//!
//! ```bash
//! gistpane
//! gistpane https://gist.github.com/octocat/aa5a315d61ae9438b18d
//! gistpane --ephemeral --default-gist aa5a315d61ae9438b18d
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use gistpane::app::App;
use gistpane::config::{
    ConfigFlags, clear_config_flags, default_store_path, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use gistpane::export::{SystemPrinter, default_print_command};
use gistpane::layout::DEFAULT_MIN_PANE_WIDTH;
use gistpane::remote::{DEFAULT_API_BASE, DEFAULT_GIST, GithubClient, RemoteLoader};
use gistpane::store::{FileStore, MemoryStore, StoreAdapter};

/// A two-pane terminal markdown editor with live preview
#[derive(Parser, Debug)]
#[command(name = "gistpane", version, about, long_about = None)]
struct Cli {
    /// Gist URL or id to load after startup
    #[arg(value_name = "GIST")]
    gist: Option<String>,

    /// File holding the persisted document and layout
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Keep everything in memory; nothing is persisted
    #[arg(long)]
    ephemeral: bool,

    /// Gist fetched at startup when no document is persisted
    #[arg(long, value_name = "ID")]
    default_gist: Option<String>,

    /// Start with the welcome placeholder instead of fetching a default gist
    #[arg(long)]
    no_default_gist: bool,

    /// Base URL of the gist API
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Minimum width of either pane, in columns
    #[arg(long, value_name = "N")]
    min_pane_width: Option<u16>,

    /// Command run with the exported HTML file to print it
    #[arg(long, value_name = "CMD")]
    print_command: Option<String>,

    /// Directory exported HTML files are written to
    #[arg(long, value_name = "PATH")]
    export_dir: Option<PathBuf>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl From<&Cli> for ConfigFlags {
    fn from(cli: &Cli) -> Self {
        Self {
            ephemeral: cli.ephemeral,
            no_default_gist: cli.no_default_gist,
            store: cli.store.clone(),
            default_gist: cli.default_gist.clone(),
            api_base: cli.api_base.clone(),
            min_pane_width: cli.min_pane_width,
            print_command: cli.print_command.clone(),
            export_dir: cli.export_dir.clone(),
            log_file: cli.log_file.clone(),
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = ConfigFlags::from(&cli);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;

    let store = if effective.ephemeral {
        StoreAdapter::new(MemoryStore::new())
    } else {
        let path = effective.store.clone().unwrap_or_else(default_store_path);
        tracing::debug!(path = %path.display(), "opening state file");
        StoreAdapter::new(FileStore::open(path))
    };

    let api_base = effective
        .api_base
        .clone()
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let client = GithubClient::new(api_base).context("Failed to build gist client")?;

    let export_dir = effective
        .export_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("gistpane"));
    let printer = SystemPrinter::new(
        export_dir,
        effective.print_command.clone().or_else(default_print_command),
    );

    let default_gist = if effective.no_default_gist {
        None
    } else {
        Some(
            effective
                .default_gist
                .clone()
                .unwrap_or_else(|| DEFAULT_GIST.to_string()),
        )
    };

    let mut app = App::new(store, RemoteLoader::new(client), printer)
        .with_default_gist(default_gist)
        .with_initial_gist(cli.gist)
        .with_min_pane_width(effective.min_pane_width.unwrap_or(DEFAULT_MIN_PANE_WIDTH));

    app.run().context("Application error")
}
