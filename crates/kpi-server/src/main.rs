//! `kpi`: KPI evaluation server and maintenance commands.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and either serves the JSON API or runs a one-shot command.
//!
//! # Password hash generation
//!
//! Accounts in `config.toml` carry argon2 PHC strings:
//!
//! ```sh
//! cargo run -p kpi-server --bin kpi -- hash-password
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::Router;
use clap::{Parser, Subcommand};
use kpi_api::ApiState;
use kpi_core::{period::Period, roster, store::KpiStore};
use kpi_store_sqlite::{SqliteRosterSource, SqliteStore};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "KPI evaluation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin.
  HashPassword,
  /// Open an evaluation period, closing whatever earlier periods left open.
  OpenPeriod {
    /// `YYYY-MM`; defaults to the current month.
    #[arg(long)]
    period: Option<Period>,
  },
  /// Import new employees from the configured roster database.
  ImportRoster,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => hash_password(),
    Command::Serve => serve(ServerConfig::load(&cli.config)?).await,
    Command::OpenPeriod { period } => {
      let cfg = ServerConfig::load(&cli.config)?;
      let store = open_store(&cfg).await?;
      let rollover = store
        .open_period(period.unwrap_or_else(Period::current))
        .await
        .context("failed to open period")?;
      println!("{}", serde_json::to_string_pretty(&rollover)?);
      Ok(())
    }
    Command::ImportRoster => {
      let cfg = ServerConfig::load(&cli.config)?;
      let store = open_store(&cfg).await?;
      let source = cfg.roster_source()?;
      let status = roster::reconcile_from(&store, source.as_ref())
        .await
        .context("roster import failed")?;
      println!("{}", serde_json::to_string_pretty(&status)?);
      Ok(())
    }
  }
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = open_store(&cfg).await?;

  if cfg.open_current_period_on_start {
    let rollover = store
      .open_period(Period::current())
      .await
      .context("failed to open the current period")?;
    info!(period = %rollover.period, opened = rollover.opened, "current period ready");
  }
  if cfg.accounts.is_empty() {
    warn!("no accounts configured; every request will be rejected");
  }

  let mut state: ApiState<SqliteStore, SqliteRosterSource> =
    ApiState::new(Arc::new(store), cfg.auth()).with_scope_depth(cfg.scope_depth);
  if let Some(source) = cfg.roster_source()? {
    state = state.with_roster(Arc::new(source));
  }

  let app = Router::new()
    .nest("/api", kpi_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

fn hash_password() -> anyhow::Result<()> {
  let password = read_password()?;
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();
  println!("{hash}");
  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
