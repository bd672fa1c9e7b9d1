//! Runtime configuration, read from a TOML file layered with `KPI_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kpi_api::{Account, AuthConfig};
use kpi_core::scope::ScopeResolver;
use kpi_store_sqlite::SqliteRosterSource;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                         String,
  #[serde(default = "default_port")]
  pub port:                         u16,
  pub store_path:                   PathBuf,
  /// Levels below their own position that members can see.
  #[serde(default = "default_scope_depth")]
  pub scope_depth:                  usize,
  /// Roll over to the current calendar month when the server starts.
  #[serde(default = "default_true")]
  pub open_current_period_on_start: bool,
  #[serde(default)]
  pub roster:                       Option<RosterConfig>,
  #[serde(default)]
  pub accounts:                     Vec<Account>,
}

/// The external staff database read by the roster import.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
  pub path:  PathBuf,
  #[serde(default = "default_roster_table")]
  pub table: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_scope_depth() -> usize { ScopeResolver::DEFAULT_DEPTH }

fn default_true() -> bool { true }

fn default_roster_table() -> String { SqliteRosterSource::DEFAULT_TABLE.to_owned() }

impl ServerConfig {
  /// Load `path` (optional) and `KPI_*` environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("KPI"))
      .build()
      .context("failed to read config file")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    Ok(cfg.expanded())
  }

  fn expanded(mut self) -> Self {
    self.store_path = expand_tilde(&self.store_path);
    if let Some(roster) = self.roster.as_mut() {
      roster.path = expand_tilde(&roster.path);
    }
    self
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig { accounts: self.accounts.clone() }
  }

  /// The configured roster feed, if any.
  pub fn roster_source(&self) -> anyhow::Result<Option<SqliteRosterSource>> {
    self
      .roster
      .as_ref()
      .map(|r| {
        SqliteRosterSource::new(&r.path, r.table.clone())
          .with_context(|| format!("invalid roster configuration for {:?}", r.path))
      })
      .transpose()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
