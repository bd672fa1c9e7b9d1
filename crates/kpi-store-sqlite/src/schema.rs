//! SQL schema for the KPI SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS positions (
    position_id   TEXT PRIMARY KEY,
    description   TEXT NOT NULL,
    department    TEXT,
    supervisor_id TEXT REFERENCES positions(position_id),
    created_at    TEXT NOT NULL,
    CHECK (supervisor_id IS NULL OR supervisor_id != position_id)
);

CREATE TABLE IF NOT EXISTS kpis (
    kpi_id       TEXT PRIMARY KEY,
    description  TEXT NOT NULL,
    unit         TEXT,
    department   TEXT,
    kpi_type     TEXT NOT NULL,              -- 'numeric' | 'criterion'
    ranges_json  TEXT NOT NULL DEFAULT '[]', -- ordered ThresholdRange list
    target       REAL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS position_kpis (
    position_id TEXT    NOT NULL REFERENCES positions(position_id),
    kpi_id      TEXT    NOT NULL REFERENCES kpis(kpi_id),
    ordinal     INTEGER NOT NULL,
    PRIMARY KEY (position_id, kpi_id)
);

-- Employees are never deleted.
CREATE TABLE IF NOT EXISTS employees (
    employee_id TEXT PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,        -- normalised roster key
    name        TEXT NOT NULL,
    position_id TEXT REFERENCES positions(position_id),
    email       TEXT,
    created_at  TEXT NOT NULL
);

-- Opened periods; the greatest one is the current period.
CREATE TABLE IF NOT EXISTS periods (
    period    TEXT PRIMARY KEY,              -- 'YYYY-MM'
    opened_at TEXT NOT NULL
);

-- Not tied to position_kpis: removing an assignment keeps its history.
CREATE TABLE IF NOT EXISTS captures (
    position_id TEXT NOT NULL REFERENCES positions(position_id),
    kpi_id      TEXT NOT NULL REFERENCES kpis(kpi_id),
    period      TEXT NOT NULL,
    value_num   REAL,
    value_text  TEXT,
    color       TEXT NOT NULL DEFAULT 'none',
    state       TEXT NOT NULL DEFAULT 'open', -- 'open' | 'closed'
    captured_at TEXT,
    closed_at   TEXT,
    closed_by   TEXT,
    PRIMARY KEY (position_id, kpi_id, period)
);

CREATE INDEX IF NOT EXISTS positions_supervisor_idx ON positions(supervisor_id);
CREATE INDEX IF NOT EXISTS employees_position_idx   ON employees(position_id);
CREATE INDEX IF NOT EXISTS captures_period_idx      ON captures(period, state);

PRAGMA user_version = 1;
";
