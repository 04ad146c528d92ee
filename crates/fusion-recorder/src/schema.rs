//! Database schema
//!
//! Created on open; the schema is append-only in spirit (migrations beyond
//! create-if-missing are handled by the host's tooling).

pub const SCHEMA: &str = r#"
PRAGMA journal_mode=WAL;
PRAGMA synchronous=NORMAL;
PRAGMA foreign_keys=ON;

CREATE TABLE IF NOT EXISTS connectors (
  id              TEXT PRIMARY KEY,
  organization_id TEXT NOT NULL,
  kind            TEXT NOT NULL,
  name            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS locations (
  id   TEXT PRIMARY KEY,
  name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS areas (
  id               TEXT PRIMARY KEY,
  name             TEXT NOT NULL,
  location_id      TEXT REFERENCES locations(id),
  armed_state      TEXT NOT NULL DEFAULT 'disarmed',
  trigger_behavior TEXT NOT NULL DEFAULT 'standard'
);

CREATE TABLE IF NOT EXISTS devices (
  id                 TEXT PRIMARY KEY,
  connector_id       TEXT NOT NULL REFERENCES connectors(id),
  external_id        TEXT NOT NULL,
  name               TEXT NOT NULL,
  device_kind        TEXT NOT NULL,
  status             TEXT,
  battery_percentage INTEGER,
  area_id            TEXT REFERENCES areas(id)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_devices_connector_external
  ON devices (connector_id, external_id);

CREATE INDEX IF NOT EXISTS idx_devices_area ON devices (area_id);

CREATE TABLE IF NOT EXISTS events (
  event_uuid         TEXT PRIMARY KEY,
  ts                 TEXT NOT NULL,
  connector_id       TEXT NOT NULL,
  device_external_id TEXT NOT NULL,
  category           TEXT NOT NULL,
  event_type         TEXT NOT NULL,
  subtype            TEXT,
  payload_json       TEXT NOT NULL,
  raw_json           TEXT NOT NULL,
  raw_event_type     TEXT
);

CREATE INDEX IF NOT EXISTS idx_events_ts ON events (ts DESC);
CREATE INDEX IF NOT EXISTS idx_events_device
  ON events (connector_id, device_external_id);
"#;
