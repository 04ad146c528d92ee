//! Automation configuration and dispatch for Fusion
//!
//! This crate owns the trigger taxonomy, the static analysis that decides
//! whether an automation needs visual context, and the AutomationManager
//! registry. Action execution lives behind the AutomationService trait,
//! implemented by the host.

mod manager;
mod trigger;

pub use manager::AutomationManager;
pub use trigger::{AutomationTrigger, FieldCondition, FieldOperator, StateMatch};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fusion_core::StandardizedEvent;

/// Automation errors
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Automation not found: {0}")]
    NotFound(String),

    #[error("Invalid automation configuration: {0}")]
    InvalidConfig(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),
}

/// Result type for automation operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// An automation definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Unique ID (auto-generated if not provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name
    pub name: String,

    /// Owning organization
    pub organization_id: String,

    /// Triggers that start the automation
    #[serde(default)]
    pub triggers: Vec<AutomationTrigger>,

    /// Actions to execute (opaque to this crate, handled by the host)
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,

    /// Whether the automation is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AutomationConfig {
    /// Whether any trigger inspects thumbnail/visual data
    ///
    /// Static analysis only; no trigger is evaluated. The thumbnail gate
    /// uses this to decide whether a snapshot is worth fetching at all.
    pub fn requires_thumbnail(&self) -> bool {
        self.triggers.iter().any(AutomationTrigger::requires_thumbnail)
    }
}

/// Thumbnail bytes attached to an event for visual context
///
/// Ephemeral: carried in real-time messages and automation dispatch, never
/// written to the relational store.
#[derive(Debug, Clone)]
pub struct EventThumbnail {
    /// JPEG bytes
    pub data: Vec<u8>,
    /// Byte size (kept separately so messages can report it without the bytes)
    pub size: usize,
    /// Internal id of the camera that produced the snapshot
    pub camera_id: String,
}

impl EventThumbnail {
    pub fn new(data: Vec<u8>, camera_id: impl Into<String>) -> Self {
        let size = data.len();
        Self {
            data,
            size,
            camera_id: camera_id.into(),
        }
    }
}

/// Consumes standardized events and fires configured automations
///
/// The pipeline's only obligation is to call this exactly once per event,
/// after persistence, with thumbnail context attached when one was fetched.
#[async_trait::async_trait]
pub trait AutomationService: Send + Sync {
    async fn process_event(
        &self,
        event: &StandardizedEvent,
        thumbnail: Option<&EventThumbnail>,
    ) -> AutomationResult<()>;
}
