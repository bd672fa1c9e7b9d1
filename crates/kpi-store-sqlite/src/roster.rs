//! [`SqliteRosterSource`]: reads roster candidates from an external staff
//! database opened read-only.

use std::path::{Path, PathBuf};

use kpi_core::roster::{RosterCandidate, RosterSource};
use rusqlite::{OpenFlags, types::Value};
use tracing::debug;

use crate::{Error, Result};

/// A staff table in another SQLite file with the columns
/// `employee_number`, `full_name` and `puesto` (position description).
#[derive(Debug, Clone)]
pub struct SqliteRosterSource {
  path:  PathBuf,
  table: String,
}

impl SqliteRosterSource {
  pub const DEFAULT_TABLE: &'static str = "personal";

  /// The table name is interpolated into SQL, so only ASCII alphanumerics
  /// and underscores are accepted.
  pub fn new(path: impl AsRef<Path>, table: impl Into<String>) -> Result<Self> {
    let table = table.into();
    let valid = !table.is_empty()
      && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
      return Err(Error::Roster(format!("invalid roster table name {table:?}")));
    }
    Ok(Self { path: path.as_ref().to_path_buf(), table })
  }

  pub fn path(&self) -> &Path { &self.path }

  async fn read(&self) -> Result<Vec<RosterCandidate>> {
    if !self.path.exists() {
      return Err(Error::Roster(format!("{} does not exist", self.path.display())));
    }
    let conn = tokio_rusqlite::Connection::open_with_flags(
      &self.path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;

    let sql = format!("SELECT employee_number, full_name, puesto FROM {}", self.table);
    let rows: Vec<(Value, Option<String>, Option<String>)> = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let candidates: Vec<RosterCandidate> = rows
      .into_iter()
      .map(|(number, name, puesto)| RosterCandidate {
        external_id:   external_id_of(number),
        name:          name.unwrap_or_default(),
        email:         None,
        position_hint: puesto.map(|p| p.trim().to_owned()).filter(|p| !p.is_empty()),
      })
      .collect();

    debug!(path = %self.path.display(), rows = candidates.len(), "roster read");
    Ok(candidates)
  }
}

/// Staff sheets imported into SQLite often store the number as `REAL`.
fn external_id_of(value: Value) -> String {
  match value {
    Value::Integer(n) => n.to_string(),
    Value::Real(f) if f.is_finite() && f.fract() == 0.0 => (f as i64).to_string(),
    Value::Real(f) => f.to_string(),
    Value::Text(s) => s,
    Value::Null | Value::Blob(_) => String::new(),
  }
}

impl RosterSource for SqliteRosterSource {
  type Error = Error;

  async fn fetch(&self) -> Result<Vec<RosterCandidate>> { self.read().await }
}
