//! `feeder` — command-line front end for the Feeder subscriber store.
//!
//! # Usage
//!
//! ```
//! feeder register --first-name Ana --last-name Beridze --personal-id 01234 \
//!   --phone 555 --address "Tbilisi, Rustaveli 1"
//! feeder list --address rustaveli
//! feeder damage rustaveli --text "Power outage"
//! ```

mod app;
mod ui;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context as _, Result};
use app::Command;
use clap::Parser;
use feeder_core::{SubscriberStore, persistence::STORAGE_KEY};
use feeder_store_sqlite::SqlitePersistence;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use ui::Output;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "feeder", version, about = "Manage electricity subscribers")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "feeder.toml")]
  config: PathBuf,

  /// SQLite file holding the subscriber data; overrides the config file.
  #[arg(long, value_name = "FILE")]
  store_path: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Settings read from the config file and `FEEDER_*` environment variables.
#[derive(Deserialize, Debug)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path:  PathBuf,
  #[serde(default = "default_storage_key")]
  storage_key: String,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/feeder/feeder.db") }

fn default_storage_key() -> String { STORAGE_KEY.to_owned() }

fn load_settings(path: &Path) -> Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("FEEDER"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?;

  // CLI flag overrides config file, which overrides the default.
  let store_path = expand_tilde(cli.store_path.as_deref().unwrap_or(&settings.store_path));

  let persistence = SqlitePersistence::open(&store_path, settings.storage_key)
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let mut store = SubscriberStore::open(persistence);

  let output = if cli.json { Output::Json } else { Output::Text };
  app::run(&mut store, cli.command, output)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
