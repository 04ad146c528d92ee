//! Trigger types
//!
//! Triggers describe which events start an automation. Each variant knows
//! whether evaluating it would need visual context; the thumbnail gate
//! relies on that static answer.

use serde::{Deserialize, Serialize};

use fusion_core::{EventCategory, EventSubtype, EventType};

/// Trigger definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum AutomationTrigger {
    /// Matches on the standardized event taxonomy
    Event(EventTrigger),

    /// Matches a device reaching a state
    DeviceState(DeviceStateTrigger),

    /// Matches analytics detections, inspecting the snapshot
    ObjectAnalysis(ObjectAnalysisTrigger),
}

impl AutomationTrigger {
    /// Trigger platform name
    pub fn platform(&self) -> &'static str {
        match self {
            AutomationTrigger::Event(_) => "event",
            AutomationTrigger::DeviceState(_) => "device_state",
            AutomationTrigger::ObjectAnalysis(_) => "object_analysis",
        }
    }

    /// Whether evaluating this trigger inspects thumbnail/visual data
    pub fn requires_thumbnail(&self) -> bool {
        match self {
            AutomationTrigger::ObjectAnalysis(_) => true,
            AutomationTrigger::Event(t) => t
                .conditions
                .iter()
                .any(|c| c.field.starts_with("thumbnail.") || c.field.starts_with("image.")),
            AutomationTrigger::DeviceState(_) => false,
        }
    }
}

/// Taxonomy-matching trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTrigger {
    /// Categories to match (empty = any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<EventCategory>,

    /// Types to match (empty = any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<EventType>,

    /// Subtypes to match (empty = any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<EventSubtype>,

    /// Payload field conditions, all of which must hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<FieldCondition>,
}

/// Device-state trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStateTrigger {
    /// Internal device ids to monitor
    pub device_ids: Vec<String>,

    /// State to match
    pub to: StateMatch,
}

/// State value matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateMatch {
    /// Exact state value
    Value(String),
    /// Any of several values
    AnyOf(Vec<String>),
}

impl StateMatch {
    /// Whether a state value matches
    pub fn matches(&self, state: &str) -> bool {
        match self {
            StateMatch::Value(v) => v == state,
            StateMatch::AnyOf(vs) => vs.iter().any(|v| v == state),
        }
    }
}

/// Analytics trigger that inspects the event snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectAnalysisTrigger {
    /// Object classes of interest (e.g. "person", "vehicle")
    pub object_classes: Vec<String>,

    /// Minimum detection confidence in [0, 1]
    #[serde(default)]
    pub min_confidence: f64,

    /// Optional region of interest, normalized [x, y, w, h]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<[f64; 4]>,
}

/// Comparison against a flattened payload field path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCondition {
    /// Dotted field path (e.g. "payload.display_state", "thumbnail.size")
    pub field: String,

    /// Comparison operator
    #[serde(default)]
    pub op: FieldOperator,

    /// Value to compare against
    pub value: serde_json::Value,
}

/// Field comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldOperator {
    #[default]
    Eq,
    Ne,
    Gt,
    Lt,
    Contains,
}
