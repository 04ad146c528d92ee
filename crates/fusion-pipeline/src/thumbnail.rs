//! Thumbnail gating and fetching
//!
//! A snapshot is only worth fetching when someone will look at it: either a
//! live subscriber on the thumbnail channel, or an enabled automation whose
//! triggers inspect visual data. The fetch itself is vendor-specific and
//! lives behind a trait; the pipeline bounds it with a deadline and treats
//! every failure as best-effort.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use fusion_automation::{AutomationManager, EventThumbnail};
use fusion_core::{thumbnail_event_channel, Device, StandardizedEvent};
use fusion_event_bus::EventChannels;

/// Errors from thumbnail fetching
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("camera unreachable: {0}")]
    CameraUnreachable(String),

    #[error("vendor error: {0}")]
    Vendor(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Fetches a snapshot for an event from one of the candidate cameras
///
/// Vendor-specific; implementations are expected to pick the best candidate
/// themselves. Returning `Ok(None)` means no camera could produce an image,
/// which is not an error.
#[async_trait::async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    async fn fetch(
        &self,
        event: &StandardizedEvent,
        cameras: &[Device],
    ) -> Result<Option<EventThumbnail>, ThumbnailError>;
}

/// Decides whether a thumbnail fetch is warranted
pub struct ThumbnailGate {
    channels: Arc<EventChannels>,
    automations: Arc<AutomationManager>,
}

impl ThumbnailGate {
    pub fn new(channels: Arc<EventChannels>, automations: Arc<AutomationManager>) -> Self {
        Self {
            channels,
            automations,
        }
    }

    /// Whether anything downstream wants visual context for this event
    ///
    /// Two independent signals, either one suffices: live subscribers on the
    /// organization's thumbnail channel, or an enabled automation whose
    /// trigger configuration inspects thumbnail data.
    pub async fn should_fetch(&self, organization_id: &str, event: &StandardizedEvent) -> bool {
        if !event.is_visually_relevant() {
            return false;
        }

        let (live_subscribers, automation_needs) = tokio::join!(
            self.live_subscribers(organization_id),
            self.automation_requires(organization_id),
        );

        debug!(
            event_id = %event.event_id,
            live_subscribers,
            automation_needs,
            "Thumbnail gate"
        );
        live_subscribers || automation_needs
    }

    async fn live_subscribers(&self, organization_id: &str) -> bool {
        let channel = thumbnail_event_channel(organization_id);
        self.channels.subscriber_count(&channel) > 0
    }

    async fn automation_requires(&self, organization_id: &str) -> bool {
        self.automations.any_requires_thumbnail(organization_id)
    }
}
