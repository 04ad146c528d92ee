//! SQLite persistence for Fusion
//!
//! The Recorder is the single source of truth: an append-only events table
//! plus mutable device/area rows. Access goes through one connection behind
//! an async mutex; every write is last-write-wins with no application-level
//! locking beyond that.

mod error;
mod schema;

pub use error::{RecorderError, RecorderResult};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use tracing::{debug, info};

use fusion_core::{
    Area, ArmedState, Connector, ConnectorKind, Device, DeviceKind, EventCategory, EventSubtype,
    EventType, Location, StandardizedEvent, TimelineEvent, TriggerBehavior,
};

/// Everything the processor needs to know about an event's surroundings,
/// resolved in one combined read
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub connector: Option<Connector>,
    pub device: Option<Device>,
    pub area: Option<Area>,
    pub location: Option<Location>,
}

/// The SQLite-backed store
pub struct Recorder {
    conn: Mutex<Connection>,
}

fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    // Fixed-width RFC 3339 so lexicographic order matches chronological order
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn ts_from_sql(s: &str) -> RecorderResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| RecorderError::Corrupt {
            what: format!("timestamp '{s}'"),
        })
}

impl Recorder {
    /// Open (or create) the database at the given path
    pub fn open(path: &std::path::Path) -> RecorderResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (tests, ephemeral hosts)
    pub fn open_in_memory() -> RecorderResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> RecorderResult<Self> {
        conn.execute_batch(schema::SCHEMA)?;
        info!("Recorder database ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a standardized event as a new immutable row
    ///
    /// The primary key on `event_uuid` enforces exactly-once storage; a
    /// replay of an already-stored id fails with
    /// [`RecorderError::DuplicateEvent`] and leaves the original row intact.
    pub async fn insert_event(
        &self,
        event: &StandardizedEvent,
        raw_event_type: Option<&str>,
    ) -> RecorderResult<()> {
        let conn = self.conn.lock().await;
        let result = conn.execute(
            "INSERT INTO events (event_uuid, ts, connector_id, device_external_id,
                                 category, event_type, subtype, payload_json, raw_json,
                                 raw_event_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                event.event_id,
                ts_to_sql(&event.timestamp),
                event.connector_id,
                event.device_external_id,
                event.category.as_str(),
                event.event_type.as_str(),
                event.subtype.map(|s| s.as_str()),
                serde_json::to_string(&event.payload)?,
                event.original_event.to_string(),
                raw_event_type,
            ],
        );

        match result {
            Ok(_) => {
                debug!(event_id = %event.event_id, "Persisted event");
                Ok(())
            }
            Err(err) if is_constraint_violation(&err) => Err(RecorderError::DuplicateEvent {
                event_id: event.event_id.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Load a stored event by id
    pub async fn get_event(&self, event_id: &str) -> RecorderResult<Option<StandardizedEvent>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT event_uuid, ts, connector_id, device_external_id, category,
                    event_type, subtype, payload_json, raw_json
             FROM events WHERE event_uuid = ?1",
            params![event_id],
            event_from_row,
        )
        .optional()?
        .transpose()
    }

    /// Resolve connector, device, area, and location for an inbound event
    ///
    /// Missing pieces are `None`; only an actual query failure is an error.
    pub async fn event_context(
        &self,
        connector_id: &str,
        device_external_id: &str,
    ) -> RecorderResult<EventContext> {
        let conn = self.conn.lock().await;

        let connector = conn
            .query_row(
                "SELECT id, organization_id, kind, name FROM connectors WHERE id = ?1",
                params![connector_id],
                connector_from_row,
            )
            .optional()?
            .transpose()?;

        let device = conn
            .query_row(
                "SELECT id, connector_id, external_id, name, device_kind, status,
                        battery_percentage, area_id
                 FROM devices WHERE connector_id = ?1 AND external_id = ?2",
                params![connector_id, device_external_id],
                device_from_row,
            )
            .optional()?
            .transpose()?;

        let area = match device.as_ref().and_then(|d| d.area_id.as_deref()) {
            Some(area_id) => conn
                .query_row(
                    "SELECT id, name, location_id, armed_state, trigger_behavior
                     FROM areas WHERE id = ?1",
                    params![area_id],
                    area_from_row,
                )
                .optional()?
                .transpose()?,
            None => None,
        };

        let location = match area.as_ref().and_then(|a| a.location_id.as_deref()) {
            Some(location_id) => conn
                .query_row(
                    "SELECT id, name FROM locations WHERE id = ?1",
                    params![location_id],
                    |row| {
                        Ok(Location {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?,
            None => None,
        };

        Ok(EventContext {
            connector,
            device,
            area,
            location,
        })
    }

    /// Cameras assigned to an area, for thumbnail sourcing
    pub async fn area_cameras(&self, area_id: &str) -> RecorderResult<Vec<Device>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, connector_id, external_id, name, device_kind, status,
                    battery_percentage, area_id
             FROM devices WHERE area_id = ?1 AND device_kind = 'camera'",
        )?;
        let rows = stmt.query_map(params![area_id], device_from_row)?;
        let mut cameras = Vec::new();
        for row in rows {
            cameras.push(row??);
        }
        Ok(cameras)
    }

    /// Apply one combined status/battery update to a device
    ///
    /// Fields passed as `None` are left untouched. Last write wins.
    pub async fn update_device_state(
        &self,
        device_id: &str,
        status: Option<&str>,
        battery_percentage: Option<i64>,
    ) -> RecorderResult<()> {
        if status.is_none() && battery_percentage.is_none() {
            return Ok(());
        }
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE devices
             SET status = COALESCE(?2, status),
                 battery_percentage = COALESCE(?3, battery_percentage)
             WHERE id = ?1",
            params![device_id, status, battery_percentage],
        )?;
        debug!(device_id, ?status, ?battery_percentage, "Updated device state");
        Ok(())
    }

    /// Set a zone's arming state
    pub async fn set_area_armed_state(
        &self,
        area_id: &str,
        state: ArmedState,
    ) -> RecorderResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE areas SET armed_state = ?2 WHERE id = ?1",
            params![area_id, state.as_str()],
        )?;
        if changed == 0 {
            return Err(RecorderError::NotFound {
                what: format!("area {area_id}"),
            });
        }
        info!(area_id, state = state.as_str(), "Set area armed state");
        Ok(())
    }

    /// Load an area by id
    pub async fn get_area(&self, area_id: &str) -> RecorderResult<Option<Area>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, name, location_id, armed_state, trigger_behavior
             FROM areas WHERE id = ?1",
            params![area_id],
            area_from_row,
        )
        .optional()?
        .transpose()
    }

    /// Load a device by internal id
    pub async fn get_device(&self, device_id: &str) -> RecorderResult<Option<Device>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, connector_id, external_id, name, device_kind, status,
                    battery_percentage, area_id
             FROM devices WHERE id = ?1",
            params![device_id],
            device_from_row,
        )
        .optional()?
        .transpose()
    }

    /// Most recent events joined with their device's area, newest first
    ///
    /// Feeds the clustering engine; ordering comes from the event timestamp,
    /// not insertion order.
    pub async fn recent_timeline_events(&self, limit: usize) -> RecorderResult<Vec<TimelineEvent>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT e.event_uuid, e.ts, e.device_external_id, a.id, a.name
             FROM events e
             LEFT JOIN devices d
               ON d.connector_id = e.connector_id AND d.external_id = e.device_external_id
             LEFT JOIN areas a ON a.id = d.area_id
             ORDER BY e.ts DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let ts: String = row.get(1)?;
            Ok((
                row.get::<_, String>(0)?,
                ts,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;
        rows.map(|r| {
            let (event_id, ts, device_external_id, area_id, area_name) = r?;
            Ok(TimelineEvent {
                event_id,
                timestamp: ts_from_sql(&ts)?,
                device_external_id,
                area_id,
                area_name,
            })
        })
        .collect()
    }

    /// Insert a connector (host/seed use)
    pub async fn insert_connector(&self, connector: &Connector) -> RecorderResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO connectors (id, organization_id, kind, name) VALUES (?1, ?2, ?3, ?4)",
            params![
                connector.id,
                connector.organization_id,
                connector.kind.as_str(),
                connector.name
            ],
        )?;
        Ok(())
    }

    /// Insert a location (host/seed use)
    pub async fn insert_location(&self, location: &Location) -> RecorderResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO locations (id, name) VALUES (?1, ?2)",
            params![location.id, location.name],
        )?;
        Ok(())
    }

    /// Insert an area (host/seed use)
    pub async fn insert_area(&self, area: &Area) -> RecorderResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO areas (id, name, location_id, armed_state, trigger_behavior)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                area.id,
                area.name,
                area.location_id,
                area.armed_state.as_str(),
                area.trigger_behavior.as_str()
            ],
        )?;
        Ok(())
    }

    /// Insert a device (host/seed use)
    pub async fn insert_device(&self, device: &Device) -> RecorderResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO devices (id, connector_id, external_id, name, device_kind,
                                  status, battery_percentage, area_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                device.id,
                device.connector_id,
                device.external_id,
                device.name,
                device.kind.as_str(),
                device.status,
                device.battery_percentage,
                device.area_id
            ],
        )?;
        Ok(())
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

type SqlResult<T> = Result<T, rusqlite::Error>;

fn event_from_row(row: &Row<'_>) -> SqlResult<RecorderResult<StandardizedEvent>> {
    let event_id: String = row.get(0)?;
    let ts: String = row.get(1)?;
    let connector_id: String = row.get(2)?;
    let device_external_id: String = row.get(3)?;
    let category: String = row.get(4)?;
    let event_type: String = row.get(5)?;
    let subtype: Option<String> = row.get(6)?;
    let payload_json: String = row.get(7)?;
    let raw_json: String = row.get(8)?;

    Ok((|| {
        Ok(StandardizedEvent {
            event_id,
            timestamp: ts_from_sql(&ts)?,
            connector_id,
            device_external_id,
            category: EventCategory::parse(&category).ok_or_else(|| RecorderError::Corrupt {
                what: format!("event category '{category}'"),
            })?,
            event_type: EventType::parse(&event_type).ok_or_else(|| RecorderError::Corrupt {
                what: format!("event type '{event_type}'"),
            })?,
            subtype: match subtype.as_deref() {
                Some(s) => Some(EventSubtype::parse(s).ok_or_else(|| RecorderError::Corrupt {
                    what: format!("event subtype '{s}'"),
                })?),
                None => None,
            },
            payload: serde_json::from_str(&payload_json)?,
            original_event: serde_json::from_str(&raw_json)?,
        })
    })())
}

fn connector_from_row(row: &Row<'_>) -> SqlResult<RecorderResult<Connector>> {
    let id: String = row.get(0)?;
    let organization_id: String = row.get(1)?;
    let kind: String = row.get(2)?;
    let name: String = row.get(3)?;

    Ok(match ConnectorKind::parse(&kind) {
        Some(kind) => Ok(Connector {
            id,
            organization_id,
            kind,
            name,
        }),
        None => Err(RecorderError::Corrupt {
            what: format!("connector kind '{kind}'"),
        }),
    })
}

fn device_from_row(row: &Row<'_>) -> SqlResult<RecorderResult<Device>> {
    let kind: String = row.get(4)?;
    let id: String = row.get(0)?;
    let connector_id: String = row.get(1)?;
    let external_id: String = row.get(2)?;
    let name: String = row.get(3)?;
    let status: Option<String> = row.get(5)?;
    let battery_percentage: Option<i64> = row.get(6)?;
    let area_id: Option<String> = row.get(7)?;

    Ok(match DeviceKind::parse(&kind) {
        Some(kind) => Ok(Device {
            id,
            connector_id,
            external_id,
            name,
            kind,
            status,
            battery_percentage,
            area_id,
        }),
        None => Err(RecorderError::Corrupt {
            what: format!("device kind '{kind}'"),
        }),
    })
}

fn area_from_row(row: &Row<'_>) -> SqlResult<RecorderResult<Area>> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let location_id: Option<String> = row.get(2)?;
    let armed_state: String = row.get(3)?;
    let trigger_behavior: String = row.get(4)?;

    Ok((|| {
        let armed_state =
            ArmedState::parse(&armed_state).ok_or_else(|| RecorderError::Corrupt {
                what: format!("armed state '{armed_state}'"),
            })?;
        let trigger_behavior =
            TriggerBehavior::parse(&trigger_behavior).ok_or_else(|| RecorderError::Corrupt {
                what: format!("trigger behavior '{trigger_behavior}'"),
            })?;
        Ok(Area {
            id,
            name,
            location_id,
            armed_state,
            trigger_behavior,
        })
    })())
}
