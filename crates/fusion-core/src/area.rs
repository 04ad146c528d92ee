//! Areas (alarm zones) and locations

use serde::{Deserialize, Serialize};

/// Arming state of an alarm zone
///
/// `Triggered` is reachable only from an armed state, and only the alarm
/// evaluator moves a zone there. Reverting out of `Triggered` is an explicit
/// operator action handled outside this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmedState {
    Disarmed,
    ArmedAway,
    ArmedStay,
    Triggered,
}

impl ArmedState {
    /// Whether risk events should be evaluated against this state
    pub fn is_armed(&self) -> bool {
        !matches!(self, ArmedState::Disarmed)
    }

    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmedState::Disarmed => "disarmed",
            ArmedState::ArmedAway => "armed_away",
            ArmedState::ArmedStay => "armed_stay",
            ArmedState::Triggered => "triggered",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "disarmed" => Some(ArmedState::Disarmed),
            "armed_away" => Some(ArmedState::ArmedAway),
            "armed_stay" => Some(ArmedState::ArmedStay),
            "triggered" => Some(ArmedState::Triggered),
            _ => None,
        }
    }
}

/// How a zone reacts to risk events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriggerBehavior {
    /// Built-in risk rules
    #[default]
    Standard,
    /// Host-supplied risk classifier
    Custom,
}

impl TriggerBehavior {
    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerBehavior::Standard => "standard",
            TriggerBehavior::Custom => "custom",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(TriggerBehavior::Standard),
            "custom" => Some(TriggerBehavior::Custom),
            _ => None,
        }
    }
}

/// An alarm zone grouping devices under a shared arming state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    /// Internal id
    pub id: String,

    /// Display name (e.g. "Warehouse Floor")
    pub name: String,

    /// Parent location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,

    /// Current arming state
    pub armed_state: ArmedState,

    /// Risk reaction mode
    #[serde(default)]
    pub trigger_behavior: TriggerBehavior,
}

impl Area {
    /// Create a disarmed area with a fresh ULID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string().to_lowercase(),
            name: name.into(),
            location_id: None,
            armed_state: ArmedState::Disarmed,
            trigger_behavior: TriggerBehavior::Standard,
        }
    }
}

/// A physical location containing areas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}
