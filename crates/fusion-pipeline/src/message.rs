//! Real-time message shapes
//!
//! What dashboards and notification workers receive on the organization
//! channels. The payload is flattened with human-readable taxonomy labels;
//! the raw vendor payload rides along for detail views.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;

use fusion_automation::EventThumbnail;
use fusion_core::StandardizedEvent;
use fusion_recorder::EventContext;

/// Thumbnail attachment on the enriched channel
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailInfo {
    /// Base64-encoded JPEG bytes
    pub data: String,
    /// Original byte size
    pub size: usize,
    /// Internal id of the source camera
    pub camera_id: String,
}

impl From<&EventThumbnail> for ThumbnailInfo {
    fn from(thumbnail: &EventThumbnail) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(&thumbnail.data),
            size: thumbnail.size,
            camera_id: thumbnail.camera_id.clone(),
        }
    }
}

/// A published event message
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEventMessage {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub organization_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,

    pub category: &'static str,
    pub category_label: &'static str,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub type_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype_label: Option<&'static str>,

    /// Normalized payload fields
    pub payload: serde_json::Value,

    /// Vendor-native payload, untouched
    pub raw: serde_json::Value,

    /// Present only on the thumbnail-enriched channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailInfo>,
}

impl RealtimeEventMessage {
    /// Build the base-channel message for an event and its resolved context
    pub fn build(
        event: &StandardizedEvent,
        organization_id: &str,
        context: &EventContext,
    ) -> Self {
        Self {
            event_id: event.event_id.clone(),
            timestamp: event.timestamp,
            organization_id: organization_id.to_string(),
            device_name: context.device.as_ref().map(|d| d.name.clone()),
            area_name: context.area.as_ref().map(|a| a.name.clone()),
            location_name: context.location.as_ref().map(|l| l.name.clone()),
            category: event.category.as_str(),
            category_label: event.category.label(),
            event_type: event.event_type.as_str(),
            type_label: event.event_type.label(),
            subtype: event.subtype.map(|s| s.as_str()),
            subtype_label: event.subtype.map(|s| s.label()),
            payload: serde_json::to_value(&event.payload).unwrap_or(serde_json::Value::Null),
            raw: event.original_event.clone(),
            thumbnail: None,
        }
    }

    /// The enriched variant carrying a thumbnail
    pub fn with_thumbnail(mut self, thumbnail: &EventThumbnail) -> Self {
        self.thumbnail = Some(ThumbnailInfo::from(thumbnail));
        self
    }

    /// Serialize for publishing
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fusion_core::{EventCategory, EventSubtype, EventType};

    #[test]
    fn test_message_carries_labels_and_raw() {
        let event = StandardizedEvent::new(
            "e1",
            Utc::now(),
            "c1",
            "d1",
            EventCategory::AccessControl,
            EventType::AccessDenied,
        )
        .with_subtype(EventSubtype::InvalidCredential)
        .with_original(serde_json::json!({"action": "denied"}));

        let msg = RealtimeEventMessage::build(&event, "org1", &EventContext::default());
        let json = msg.to_json();

        assert_eq!(json["organization_id"], "org1");
        assert_eq!(json["type"], "access_denied");
        assert_eq!(json["type_label"], "Access Denied");
        assert_eq!(json["subtype_label"], "Invalid Credential");
        assert_eq!(json["raw"]["action"], "denied");
        assert!(json.get("thumbnail").is_none());
    }

    #[test]
    fn test_thumbnail_variant_encodes_bytes() {
        let event = StandardizedEvent::new(
            "e1",
            Utc::now(),
            "c1",
            "d1",
            EventCategory::Analytics,
            EventType::ObjectDetected,
        );
        let thumbnail = EventThumbnail::new(vec![0xFF, 0xD8, 0xFF], "cam1");

        let msg = RealtimeEventMessage::build(&event, "org1", &EventContext::default())
            .with_thumbnail(&thumbnail);
        let json = msg.to_json();

        assert_eq!(json["thumbnail"]["size"], 3);
        assert_eq!(json["thumbnail"]["camera_id"], "cam1");
        assert_eq!(json["thumbnail"]["data"], "/9j/");
    }
}
