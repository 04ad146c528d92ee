//! Event taxonomy
//!
//! Fixed, vendor-agnostic classification of inbound events. Drivers map
//! vendor payloads onto these enums during standardization; everything
//! downstream (persistence, alarm evaluation, automations) matches on them.

use serde::{Deserialize, Serialize};

/// Top-level event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Device state changes (sensors, locks, switches)
    DeviceState,
    /// Access control events (credentials, doors)
    AccessControl,
    /// Video analytics events (object detection, line crossing)
    Analytics,
    /// Device health and connectivity
    Diagnostics,
    /// Unrecognized by the standardizer
    Unknown,
}

impl EventCategory {
    /// Human-readable label used in real-time messages
    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::DeviceState => "Device State",
            EventCategory::AccessControl => "Access Control",
            EventCategory::Analytics => "Analytics",
            EventCategory::Diagnostics => "Diagnostics",
            EventCategory::Unknown => "Unknown",
        }
    }

    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::DeviceState => "device_state",
            EventCategory::AccessControl => "access_control",
            EventCategory::Analytics => "analytics",
            EventCategory::Diagnostics => "diagnostics",
            EventCategory::Unknown => "unknown",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "device_state" => Some(EventCategory::DeviceState),
            "access_control" => Some(EventCategory::AccessControl),
            "analytics" => Some(EventCategory::Analytics),
            "diagnostics" => Some(EventCategory::Diagnostics),
            "unknown" => Some(EventCategory::Unknown),
            _ => None,
        }
    }
}

/// Event type within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StateChanged,
    BatteryLevel,
    AccessGranted,
    AccessDenied,
    DoorForcedOpen,
    DoorHeldOpen,
    Intrusion,
    MotionDetected,
    ObjectDetected,
    LoiteringDetected,
    LineCrossed,
    ConnectionStatus,
    Unknown,
}

impl EventType {
    /// Human-readable label used in real-time messages
    pub fn label(&self) -> &'static str {
        match self {
            EventType::StateChanged => "State Changed",
            EventType::BatteryLevel => "Battery Level",
            EventType::AccessGranted => "Access Granted",
            EventType::AccessDenied => "Access Denied",
            EventType::DoorForcedOpen => "Door Forced Open",
            EventType::DoorHeldOpen => "Door Held Open",
            EventType::Intrusion => "Intrusion",
            EventType::MotionDetected => "Motion Detected",
            EventType::ObjectDetected => "Object Detected",
            EventType::LoiteringDetected => "Loitering Detected",
            EventType::LineCrossed => "Line Crossed",
            EventType::ConnectionStatus => "Connection Status",
            EventType::Unknown => "Unknown",
        }
    }

    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::StateChanged => "state_changed",
            EventType::BatteryLevel => "battery_level",
            EventType::AccessGranted => "access_granted",
            EventType::AccessDenied => "access_denied",
            EventType::DoorForcedOpen => "door_forced_open",
            EventType::DoorHeldOpen => "door_held_open",
            EventType::Intrusion => "intrusion",
            EventType::MotionDetected => "motion_detected",
            EventType::ObjectDetected => "object_detected",
            EventType::LoiteringDetected => "loitering_detected",
            EventType::LineCrossed => "line_crossed",
            EventType::ConnectionStatus => "connection_status",
            EventType::Unknown => "unknown",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "state_changed" => Some(EventType::StateChanged),
            "battery_level" => Some(EventType::BatteryLevel),
            "access_granted" => Some(EventType::AccessGranted),
            "access_denied" => Some(EventType::AccessDenied),
            "door_forced_open" => Some(EventType::DoorForcedOpen),
            "door_held_open" => Some(EventType::DoorHeldOpen),
            "intrusion" => Some(EventType::Intrusion),
            "motion_detected" => Some(EventType::MotionDetected),
            "object_detected" => Some(EventType::ObjectDetected),
            "loitering_detected" => Some(EventType::LoiteringDetected),
            "line_crossed" => Some(EventType::LineCrossed),
            "connection_status" => Some(EventType::ConnectionStatus),
            "unknown" => Some(EventType::Unknown),
            _ => None,
        }
    }
}

/// Optional event subtype refining the type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubtype {
    InvalidCredential,
    ExpiredCredential,
    AntipassbackViolation,
    DoorLocked,
    Person,
    Vehicle,
    Animal,
}

impl EventSubtype {
    /// Human-readable label used in real-time messages
    pub fn label(&self) -> &'static str {
        match self {
            EventSubtype::InvalidCredential => "Invalid Credential",
            EventSubtype::ExpiredCredential => "Expired Credential",
            EventSubtype::AntipassbackViolation => "Antipassback Violation",
            EventSubtype::DoorLocked => "Door Locked",
            EventSubtype::Person => "Person",
            EventSubtype::Vehicle => "Vehicle",
            EventSubtype::Animal => "Animal",
        }
    }

    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSubtype::InvalidCredential => "invalid_credential",
            EventSubtype::ExpiredCredential => "expired_credential",
            EventSubtype::AntipassbackViolation => "antipassback_violation",
            EventSubtype::DoorLocked => "door_locked",
            EventSubtype::Person => "person",
            EventSubtype::Vehicle => "vehicle",
            EventSubtype::Animal => "animal",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "invalid_credential" => Some(EventSubtype::InvalidCredential),
            "expired_credential" => Some(EventSubtype::ExpiredCredential),
            "antipassback_violation" => Some(EventSubtype::AntipassbackViolation),
            "door_locked" => Some(EventSubtype::DoorLocked),
            "person" => Some(EventSubtype::Person),
            "vehicle" => Some(EventSubtype::Vehicle),
            "animal" => Some(EventSubtype::Animal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&EventType::DoorForcedOpen).unwrap();
        assert_eq!(json, "\"door_forced_open\"");

        let parsed: EventCategory = serde_json::from_str("\"access_control\"").unwrap();
        assert_eq!(parsed, EventCategory::AccessControl);
    }

    #[test]
    fn test_labels() {
        assert_eq!(EventType::AccessDenied.label(), "Access Denied");
        assert_eq!(EventSubtype::InvalidCredential.label(), "Invalid Credential");
        assert_eq!(EventCategory::Analytics.label(), "Analytics");
    }
}
