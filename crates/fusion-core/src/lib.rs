//! Core types for Fusion
//!
//! This crate provides the fundamental types used throughout the Fusion
//! event pipeline: the event taxonomy, StandardizedEvent, Device, Area,
//! Connector, and the raw-event-type sniffer for vendor payloads.

mod area;
mod connector;
mod device;
mod event;
mod raw;
mod taxonomy;

pub use area::{Area, ArmedState, Location, TriggerBehavior};
pub use connector::{Connector, ConnectorKind};
pub use device::{Device, DeviceKind};
pub use event::{EventPayload, StandardizedEvent, TimelineEvent};
pub use raw::raw_event_type;
pub use taxonomy::{EventCategory, EventSubtype, EventType};

/// Organization-scoped base event channel name
pub fn base_event_channel(organization_id: &str) -> String {
    format!("org:{organization_id}:events")
}

/// Organization-scoped channel carrying thumbnail-enriched event messages
pub fn thumbnail_event_channel(organization_id: &str) -> String {
    format!("org:{organization_id}:events:thumbnails")
}
