//! StandardizedEvent: the canonical representation of an inbound event
//!
//! Drivers translate vendor-native payloads into this shape once; the rest
//! of the pipeline consumes it without knowing which vendor produced it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{EventCategory, EventSubtype, EventType};

/// Normalized payload fields extracted during standardization
///
/// Fields a driver could not populate stay `None`; anything vendor-specific
/// that survived normalization but has no dedicated field lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    /// Display-ready state value (e.g. "open", "motion", "locked")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_state: Option<String>,

    /// Battery percentage reported by the device, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<i64>,

    /// Analytics object track identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_track_id: Option<String>,

    /// Analytics detection confidence in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Remaining normalized fields, in standardizer order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// A vendor-agnostic event record
///
/// Constructed exactly once by a driver-specific standardizer, consumed
/// exactly once by the event processor, immutable thereafter. `device_external_id`
/// is the vendor's identifier, not the internal device UUID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizedEvent {
    /// Unique, stable event identifier
    pub event_id: String,

    /// When the event occurred
    pub timestamp: DateTime<Utc>,

    /// Connector that produced the event
    pub connector_id: String,

    /// Vendor-scoped device identifier
    pub device_external_id: String,

    /// Event category
    pub category: EventCategory,

    /// Event type
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Optional subtype refinement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<EventSubtype>,

    /// Normalized payload fields
    #[serde(default)]
    pub payload: EventPayload,

    /// Opaque vendor-native payload, preserved for audit and raw display
    pub original_event: serde_json::Value,
}

/// An event joined with its device's area membership
///
/// The view the timeline and clustering layers operate on; the recorder
/// produces it by joining events against devices and areas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub device_external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
}

impl StandardizedEvent {
    /// Create an event with the given identity and taxonomy, empty payload
    pub fn new(
        event_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        connector_id: impl Into<String>,
        device_external_id: impl Into<String>,
        category: EventCategory,
        event_type: EventType,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            connector_id: connector_id.into(),
            device_external_id: device_external_id.into(),
            category,
            event_type,
            subtype: None,
            payload: EventPayload::default(),
            original_event: serde_json::Value::Null,
        }
    }

    /// Set the subtype
    pub fn with_subtype(mut self, subtype: EventSubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Set the normalized payload
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Attach the vendor-native payload
    pub fn with_original(mut self, original: serde_json::Value) -> Self {
        self.original_event = original;
        self
    }

    /// Whether a thumbnail could add useful context for this event
    ///
    /// Analytics events are inherently visual; access-control events get
    /// visual confirmation of who was at the door. Plain device-state and
    /// diagnostics events never warrant a camera fetch.
    pub fn is_visually_relevant(&self) -> bool {
        matches!(
            self.category,
            EventCategory::Analytics | EventCategory::AccessControl
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_relevance_by_category() {
        let analytics = StandardizedEvent::new(
            "e1",
            Utc::now(),
            "c1",
            "d1",
            EventCategory::Analytics,
            EventType::ObjectDetected,
        );
        assert!(analytics.is_visually_relevant());

        let state = StandardizedEvent::new(
            "e2",
            Utc::now(),
            "c1",
            "d1",
            EventCategory::DeviceState,
            EventType::StateChanged,
        );
        assert!(!state.is_visually_relevant());
    }

    #[test]
    fn test_serde_round_trip_preserves_original() {
        let event = StandardizedEvent::new(
            "e1",
            Utc::now(),
            "c1",
            "d1",
            EventCategory::AccessControl,
            EventType::AccessDenied,
        )
        .with_subtype(EventSubtype::InvalidCredential)
        .with_original(serde_json::json!({"action": "denied", "door": 3}));

        let json = serde_json::to_string(&event).unwrap();
        let back: StandardizedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_id, "e1");
        assert_eq!(back.subtype, Some(EventSubtype::InvalidCredential));
        assert_eq!(back.original_event["door"], 3);
    }
}
