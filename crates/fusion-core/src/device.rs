//! Device record
//!
//! Internal representation of a connector-owned device. The pipeline only
//! mutates `status` and `battery_percentage`; everything else is managed by
//! the CRUD layer outside this workspace.

use serde::{Deserialize, Serialize};

/// Functional class of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Sensor,
    Lock,
    Camera,
    Door,
    Switch,
    Hub,
    Unknown,
}

impl DeviceKind {
    /// Device classes that participate in security-risk classification
    pub fn is_security_class(&self) -> bool {
        matches!(
            self,
            DeviceKind::Sensor | DeviceKind::Lock | DeviceKind::Door | DeviceKind::Camera
        )
    }

    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Sensor => "sensor",
            DeviceKind::Lock => "lock",
            DeviceKind::Camera => "camera",
            DeviceKind::Door => "door",
            DeviceKind::Switch => "switch",
            DeviceKind::Hub => "hub",
            DeviceKind::Unknown => "unknown",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sensor" => Some(DeviceKind::Sensor),
            "lock" => Some(DeviceKind::Lock),
            "camera" => Some(DeviceKind::Camera),
            "door" => Some(DeviceKind::Door),
            "switch" => Some(DeviceKind::Switch),
            "hub" => Some(DeviceKind::Hub),
            "unknown" => Some(DeviceKind::Unknown),
            _ => None,
        }
    }
}

/// A device known to Fusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Internal UUID
    pub id: String,

    /// Owning connector
    pub connector_id: String,

    /// Vendor-scoped identifier (matches `StandardizedEvent::device_external_id`)
    pub external_id: String,

    /// Display name
    pub name: String,

    /// Functional class
    pub kind: DeviceKind,

    /// Last reported status value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Last accepted battery percentage, 0..=100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<i64>,

    /// Area membership (zero or one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
}

impl Device {
    /// Create a device with a fresh internal UUID
    pub fn new(
        connector_id: impl Into<String>,
        external_id: impl Into<String>,
        name: impl Into<String>,
        kind: DeviceKind,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            connector_id: connector_id.into(),
            external_id: external_id.into(),
            name: name.into(),
            kind,
            status: None,
            battery_percentage: None,
            area_id: None,
        }
    }

    /// Assign the device to an area
    pub fn in_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }
}
