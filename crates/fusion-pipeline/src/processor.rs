//! The event processor
//!
//! One standardized event in, a fixed sequence of consequences out.
//! Persistence is foundational: if the insert fails the whole operation
//! aborts. Every later step is a best-effort step: logged on failure,
//! never allowed to stop the steps after it. An event is never lost to a
//! broken camera or a flaky automation.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{instrument, warn};

use fusion_alarm::{AlarmEvaluator, RiskClassifier, StandardRiskRules};
use fusion_automation::{AutomationManager, AutomationService, EventThumbnail};
use fusion_clustering::{cluster_events_by_proximity, ClusterConfig, EventGroup};
use fusion_core::{
    base_event_channel, raw_event_type, thumbnail_event_channel, StandardizedEvent,
};
use fusion_event_bus::EventChannels;
use fusion_recorder::{Recorder, RecorderError};

use crate::message::RealtimeEventMessage;
use crate::thumbnail::{ThumbnailError, ThumbnailFetcher, ThumbnailGate};

/// Default deadline for one vendor snapshot fetch
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that abort event processing
///
/// Only the foundational persistence step propagates; everything else is
/// handled in place.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("persistence: {0}")]
    Persistence(#[from] RecorderError),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Log a failed optional step and keep going
fn best_effort<T, E: std::fmt::Display>(
    step: &'static str,
    event_id: &str,
    result: Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(step, event_id, error = %err, "Best-effort step failed");
            None
        }
    }
}

/// Battery values outside [0, 100] are dropped from the update, not clamped
fn validated_battery(event_id: &str, battery: Option<i64>) -> Option<i64> {
    match battery {
        Some(b) if (0..=100).contains(&b) => Some(b),
        Some(b) => {
            warn!(event_id, battery = b, "Battery percentage out of range, dropping");
            None
        }
        None => None,
    }
}

/// Processes standardized events end to end
///
/// All collaborators are injected; the processor holds no mutable state of
/// its own and one instance serves every invocation.
pub struct EventProcessor<C: RiskClassifier = StandardRiskRules> {
    recorder: Arc<Recorder>,
    channels: Arc<EventChannels>,
    automation_service: Arc<dyn AutomationService>,
    fetcher: Arc<dyn ThumbnailFetcher>,
    gate: ThumbnailGate,
    evaluator: AlarmEvaluator<C>,
    fetch_timeout: Duration,
    cluster_config: ClusterConfig,
}

impl EventProcessor<StandardRiskRules> {
    /// Processor with the built-in risk rules
    pub fn new(
        recorder: Arc<Recorder>,
        channels: Arc<EventChannels>,
        automations: Arc<AutomationManager>,
        automation_service: Arc<dyn AutomationService>,
        fetcher: Arc<dyn ThumbnailFetcher>,
    ) -> Self {
        Self::with_classifier(
            recorder,
            channels,
            automations,
            automation_service,
            fetcher,
            StandardRiskRules,
        )
    }
}

impl<C: RiskClassifier> EventProcessor<C> {
    /// Processor with a host-supplied risk classifier
    pub fn with_classifier(
        recorder: Arc<Recorder>,
        channels: Arc<EventChannels>,
        automations: Arc<AutomationManager>,
        automation_service: Arc<dyn AutomationService>,
        fetcher: Arc<dyn ThumbnailFetcher>,
        classifier: C,
    ) -> Self {
        Self {
            recorder,
            channels: Arc::clone(&channels),
            automation_service,
            fetcher,
            gate: ThumbnailGate::new(channels, automations),
            evaluator: AlarmEvaluator::new(classifier),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cluster_config: ClusterConfig::default(),
        }
    }

    /// Override the thumbnail fetch deadline
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Override the clustering windows
    pub fn with_cluster_config(mut self, config: ClusterConfig) -> Self {
        self.cluster_config = config;
        self
    }

    /// Recent activity grouped for timeline display
    ///
    /// Reads the newest `limit` events (by event timestamp, not storage
    /// order) and clusters them; nothing is persisted.
    pub async fn recent_event_groups(&self, limit: usize) -> PipelineResult<Vec<EventGroup>> {
        let events = self.recorder.recent_timeline_events(limit).await?;
        Ok(cluster_events_by_proximity(&events, &self.cluster_config))
    }

    /// Process one event: persist, then fan out the consequences
    ///
    /// At-least-once semantics: replaying an event id fails the persistence
    /// step with a duplicate error, which propagates; there is no silent
    /// dedup.
    #[instrument(skip(self, event), fields(event_id = %event.event_id))]
    pub async fn process_and_persist_event(
        &self,
        event: StandardizedEvent,
    ) -> PipelineResult<()> {
        // 1. Best-effort recovery of the vendor-native event type string
        let raw_type = raw_event_type(&event.original_event);

        // 2. Foundational persistence; aborts on failure
        self.recorder
            .insert_event(&event, raw_type.as_deref())
            .await?;

        // 3. Connector, device, area, and location in one combined read
        let context = best_effort(
            "resolve_context",
            &event.event_id,
            self.recorder
                .event_context(&event.connector_id, &event.device_external_id)
                .await,
        )
        .unwrap_or_default();

        // 4. Candidate cameras for the event's area
        let cameras = match context.area.as_ref() {
            Some(area) => best_effort(
                "resolve_cameras",
                &event.event_id,
                self.recorder.area_cameras(&area.id).await,
            )
            .unwrap_or_default(),
            None => Vec::new(),
        };

        // 5. Gate, then fetch under a deadline
        let organization_id = context
            .connector
            .as_ref()
            .map(|c| c.organization_id.clone());
        let mut thumbnail: Option<EventThumbnail> = None;
        if let Some(org) = organization_id.as_deref() {
            if !cameras.is_empty() && self.gate.should_fetch(org, &event).await {
                thumbnail = self.fetch_thumbnail(&event, &cameras).await;
            }
        }

        // 6. Publish: base channel always, enriched channel only when
        //    someone is listening
        match organization_id.as_deref() {
            Some(org) => {
                let message = RealtimeEventMessage::build(&event, org, &context);
                self.channels
                    .publish(&base_event_channel(org), message.to_json());

                let thumb_channel = thumbnail_event_channel(org);
                if self.channels.subscriber_count(&thumb_channel) > 0 {
                    let enriched = match thumbnail.as_ref() {
                        Some(t) => message.with_thumbnail(t),
                        None => message,
                    };
                    self.channels.publish(&thumb_channel, enriched.to_json());
                }
            }
            None => warn!(
                event_id = %event.event_id,
                connector_id = %event.connector_id,
                "No connector resolved, skipping real-time publish"
            ),
        }

        // 7. One combined device update for status and/or battery
        if let Some(device) = context.device.as_ref() {
            let status = event.payload.display_state.as_deref();
            let battery = validated_battery(&event.event_id, event.payload.battery_percentage);
            if status.is_some() || battery.is_some() {
                best_effort(
                    "update_device_state",
                    &event.event_id,
                    self.recorder
                        .update_device_state(&device.id, status, battery)
                        .await,
                );
            }
        }

        // 8. Alarm evaluation for the device's zone
        if let (Some(device), Some(area)) = (context.device.as_ref(), context.area.as_ref()) {
            best_effort(
                "alarm_evaluation",
                &event.event_id,
                self.evaluator
                    .evaluate(&self.recorder, &event, device, area)
                    .await,
            );
        }

        // 9. Automation dispatch, with thumbnail context when one exists
        best_effort(
            "automation_dispatch",
            &event.event_id,
            self.automation_service
                .process_event(&event, thumbnail.as_ref())
                .await,
        );

        Ok(())
    }

    async fn fetch_thumbnail(
        &self,
        event: &StandardizedEvent,
        cameras: &[fusion_core::Device],
    ) -> Option<EventThumbnail> {
        let result = match tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(event, cameras),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ThumbnailError::Timeout(self.fetch_timeout)),
        };
        best_effort("thumbnail_fetch", &event.event_id, result).flatten()
    }
}
