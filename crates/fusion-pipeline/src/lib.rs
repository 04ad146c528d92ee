//! The Fusion event pipeline
//!
//! Ties the pieces together: persistence, context resolution, thumbnail
//! gating, real-time publishing, device-state updates, alarm evaluation,
//! and automation dispatch. The entry point is
//! [`EventProcessor::process_and_persist_event`].

mod message;
mod processor;
mod thumbnail;

pub use message::{RealtimeEventMessage, ThumbnailInfo};
pub use processor::{EventProcessor, PipelineError, PipelineResult};
pub use thumbnail::{ThumbnailError, ThumbnailFetcher, ThumbnailGate};

pub use fusion_clustering::{ClusterConfig, EventGroup};
