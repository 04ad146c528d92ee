//! End-to-end pipeline scenarios against an in-memory store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;

use fusion_automation::{
    AutomationConfig, AutomationError, AutomationManager, AutomationResult, AutomationService,
    EventThumbnail,
};
use fusion_core::{
    base_event_channel, thumbnail_event_channel, Area, ArmedState, Connector, ConnectorKind,
    Device, DeviceKind, EventCategory, EventPayload, EventSubtype, EventType, Location,
    StandardizedEvent,
};
use fusion_event_bus::EventChannels;
use fusion_pipeline::{EventProcessor, PipelineError, ThumbnailError, ThumbnailFetcher};
use fusion_recorder::{Recorder, RecorderError};

/// Records every dispatch and whether it carried a thumbnail
#[derive(Default)]
struct RecordingAutomationService {
    calls: tokio::sync::Mutex<Vec<(String, bool)>>,
}

#[async_trait::async_trait]
impl AutomationService for RecordingAutomationService {
    async fn process_event(
        &self,
        event: &StandardizedEvent,
        thumbnail: Option<&EventThumbnail>,
    ) -> AutomationResult<()> {
        self.calls
            .lock()
            .await
            .push((event.event_id.clone(), thumbnail.is_some()));
        Ok(())
    }
}

/// Always fails; the pipeline must shrug it off
struct FailingAutomationService;

#[async_trait::async_trait]
impl AutomationService for FailingAutomationService {
    async fn process_event(
        &self,
        _event: &StandardizedEvent,
        _thumbnail: Option<&EventThumbnail>,
    ) -> AutomationResult<()> {
        Err(AutomationError::Dispatch("downstream offline".into()))
    }
}

/// Counts fetch attempts and returns a tiny fixed image
#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ThumbnailFetcher for CountingFetcher {
    async fn fetch(
        &self,
        _event: &StandardizedEvent,
        cameras: &[Device],
    ) -> Result<Option<EventThumbnail>, ThumbnailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(EventThumbnail::new(
            vec![0xFF, 0xD8, 0xFF],
            cameras[0].id.clone(),
        )))
    }
}

struct Harness {
    recorder: Arc<Recorder>,
    channels: Arc<EventChannels>,
    automations: Arc<AutomationManager>,
    service: Arc<RecordingAutomationService>,
    fetcher: Arc<CountingFetcher>,
}

impl Harness {
    async fn new(armed_state: ArmedState, with_camera: bool) -> Self {
        let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();

        let recorder = Arc::new(Recorder::open_in_memory().unwrap());
        recorder
            .insert_connector(&Connector {
                id: "c1".into(),
                organization_id: "org1".into(),
                kind: ConnectorKind::NetBox,
                name: "NetBox".into(),
            })
            .await
            .unwrap();
        recorder
            .insert_location(&Location {
                id: "loc1".into(),
                name: "HQ".into(),
            })
            .await
            .unwrap();

        let mut area = Area::new("Server Room");
        area.id = "z1".into();
        area.location_id = Some("loc1".into());
        area.armed_state = armed_state;
        recorder.insert_area(&area).await.unwrap();

        let mut device = Device::new("c1", "d1", "Server Door", DeviceKind::Door).in_area("z1");
        device.id = "dev1".into();
        recorder.insert_device(&device).await.unwrap();

        if with_camera {
            let mut camera =
                Device::new("c1", "cam1", "Server Cam", DeviceKind::Camera).in_area("z1");
            camera.id = "devcam".into();
            recorder.insert_device(&camera).await.unwrap();
        }

        Self {
            recorder,
            channels: Arc::new(EventChannels::new()),
            automations: Arc::new(AutomationManager::new()),
            service: Arc::new(RecordingAutomationService::default()),
            fetcher: Arc::new(CountingFetcher::default()),
        }
    }

    fn processor(&self) -> EventProcessor {
        EventProcessor::new(
            Arc::clone(&self.recorder),
            Arc::clone(&self.channels),
            Arc::clone(&self.automations),
            self.service.clone(),
            self.fetcher.clone(),
        )
    }
}

fn access_denied(id: &str) -> StandardizedEvent {
    StandardizedEvent::new(
        id,
        Utc::now(),
        "c1",
        "d1",
        EventCategory::AccessControl,
        EventType::AccessDenied,
    )
    .with_subtype(EventSubtype::InvalidCredential)
    .with_original(serde_json::json!({"Event": {"ActivityType": "AccessDenied"}}))
}

fn analytics(id: &str) -> StandardizedEvent {
    StandardizedEvent::new(
        id,
        Utc::now(),
        "c1",
        "d1",
        EventCategory::Analytics,
        EventType::ObjectDetected,
    )
    .with_subtype(EventSubtype::Person)
    .with_original(serde_json::json!({"eventType": "analyticsSdkObjectDetected"}))
}

#[tokio::test]
async fn armed_zone_risk_event_triggers_and_dispatches() {
    let harness = Harness::new(ArmedState::ArmedAway, false).await;
    let processor = harness.processor();

    processor
        .process_and_persist_event(access_denied("e1"))
        .await
        .unwrap();

    let stored = harness.recorder.get_event("e1").await.unwrap().unwrap();
    assert_eq!(stored.event_id, "e1");

    let area = harness.recorder.get_area("z1").await.unwrap().unwrap();
    assert_eq!(area.armed_state, ArmedState::Triggered);

    let calls = harness.service.calls.lock().await;
    assert_eq!(calls.as_slice(), &[("e1".to_string(), false)]);
}

#[tokio::test]
async fn disarmed_zone_records_but_never_triggers() {
    let harness = Harness::new(ArmedState::Disarmed, false).await;
    let processor = harness.processor();

    processor
        .process_and_persist_event(access_denied("e1"))
        .await
        .unwrap();

    assert!(harness.recorder.get_event("e1").await.unwrap().is_some());

    let area = harness.recorder.get_area("z1").await.unwrap().unwrap();
    assert_eq!(area.armed_state, ArmedState::Disarmed);

    let calls = harness.service.calls.lock().await;
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn gate_closed_means_no_fetch_and_single_publish() {
    let harness = Harness::new(ArmedState::Disarmed, true).await;
    let mut base_rx = harness.channels.subscribe(&base_event_channel("org1"));
    let processor = harness.processor();

    processor
        .process_and_persist_event(analytics("e1"))
        .await
        .unwrap();

    // Zero thumbnail subscribers, zero visual automations: no fetch
    assert_eq!(harness.fetcher.calls.load(Ordering::SeqCst), 0);

    let message = base_rx.recv().await.unwrap();
    assert_eq!(message["event_id"], "e1");
    assert!(message.get("thumbnail").is_none());
    assert_eq!(
        harness
            .channels
            .subscriber_count(&thumbnail_event_channel("org1")),
        0
    );
}

#[tokio::test]
async fn live_subscriber_opens_gate_and_enriches_publish() {
    let harness = Harness::new(ArmedState::Disarmed, true).await;
    let mut base_rx = harness.channels.subscribe(&base_event_channel("org1"));
    let mut thumb_rx = harness
        .channels
        .subscribe(&thumbnail_event_channel("org1"));
    let processor = harness.processor();

    processor
        .process_and_persist_event(analytics("e1"))
        .await
        .unwrap();

    assert_eq!(harness.fetcher.calls.load(Ordering::SeqCst), 1);

    let base = base_rx.recv().await.unwrap();
    assert!(base.get("thumbnail").is_none());

    let enriched = thumb_rx.recv().await.unwrap();
    assert_eq!(enriched["thumbnail"]["size"], 3);
    assert_eq!(enriched["thumbnail"]["camera_id"], "devcam");

    // Dispatch carried the thumbnail context
    let calls = harness.service.calls.lock().await;
    assert_eq!(calls.as_slice(), &[("e1".to_string(), true)]);
}

#[tokio::test]
async fn visual_automation_opens_gate_without_subscribers() {
    let harness = Harness::new(ArmedState::Disarmed, true).await;
    let config: AutomationConfig = serde_json::from_str(
        r#"{
            "name": "Person at server door",
            "organization_id": "org1",
            "triggers": [{"trigger": "object_analysis", "object_classes": ["person"]}]
        }"#,
    )
    .unwrap();
    harness.automations.load(vec![config]).unwrap();

    let processor = harness.processor();
    processor
        .process_and_persist_event(analytics("e1"))
        .await
        .unwrap();

    assert_eq!(harness.fetcher.calls.load(Ordering::SeqCst), 1);

    // Fetched for the automation even though nobody subscribes
    let calls = harness.service.calls.lock().await;
    assert_eq!(calls.as_slice(), &[("e1".to_string(), true)]);
}

#[tokio::test]
async fn battery_validation_rejects_out_of_range() {
    let harness = Harness::new(ArmedState::Disarmed, false).await;
    let processor = harness.processor();

    let mut event = access_denied("e1");
    event.category = EventCategory::DeviceState;
    event.event_type = EventType::BatteryLevel;
    event.subtype = None;
    event.payload = EventPayload {
        battery_percentage: Some(150),
        ..EventPayload::default()
    };
    processor.process_and_persist_event(event).await.unwrap();

    let device = harness.recorder.get_device("dev1").await.unwrap().unwrap();
    assert_eq!(device.battery_percentage, None);

    let mut event = access_denied("e2");
    event.category = EventCategory::DeviceState;
    event.event_type = EventType::BatteryLevel;
    event.subtype = None;
    event.payload = EventPayload {
        battery_percentage: Some(42),
        ..EventPayload::default()
    };
    processor.process_and_persist_event(event).await.unwrap();

    let device = harness.recorder.get_device("dev1").await.unwrap().unwrap();
    assert_eq!(device.battery_percentage, Some(42));
}

#[tokio::test]
async fn status_update_from_display_state() {
    let harness = Harness::new(ArmedState::Disarmed, false).await;
    let processor = harness.processor();

    let mut event = access_denied("e1");
    event.category = EventCategory::DeviceState;
    event.event_type = EventType::StateChanged;
    event.subtype = None;
    event.payload = EventPayload {
        display_state: Some("open".into()),
        ..EventPayload::default()
    };
    processor.process_and_persist_event(event).await.unwrap();

    let device = harness.recorder.get_device("dev1").await.unwrap().unwrap();
    assert_eq!(device.status.as_deref(), Some("open"));
}

#[tokio::test]
async fn duplicate_event_id_aborts_with_no_second_dispatch() {
    let harness = Harness::new(ArmedState::Disarmed, false).await;
    let processor = harness.processor();

    processor
        .process_and_persist_event(access_denied("e1"))
        .await
        .unwrap();

    let err = processor
        .process_and_persist_event(access_denied("e1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Persistence(RecorderError::DuplicateEvent { .. })
    ));

    let calls = harness.service.calls.lock().await;
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn unknown_device_still_persists_and_dispatches() {
    let harness = Harness::new(ArmedState::ArmedAway, false).await;
    let processor = harness.processor();

    let mut event = access_denied("e1");
    event.device_external_id = "ghost".into();
    processor.process_and_persist_event(event).await.unwrap();

    assert!(harness.recorder.get_event("e1").await.unwrap().is_some());

    // No device, no area: the zone stays untouched
    let area = harness.recorder.get_area("z1").await.unwrap().unwrap();
    assert_eq!(area.armed_state, ArmedState::ArmedAway);

    let calls = harness.service.calls.lock().await;
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn recent_event_groups_cluster_by_area_and_time() {
    let harness = Harness::new(ArmedState::Disarmed, false).await;
    let processor = harness.processor();

    // All three share a device, so the tighter same-device window applies
    let base = Utc::now();
    for (id, offset) in [("e1", 0i64), ("e2", 10), ("e3", 600)] {
        let mut event = access_denied(id);
        event.timestamp = base + chrono::Duration::seconds(offset);
        processor.process_and_persist_event(event).await.unwrap();
    }

    let groups = processor.recent_event_groups(50).await.unwrap();
    assert_eq!(groups.len(), 2);

    // Most recent activity first; the burst of two comes second
    assert_eq!(groups[0].events.len(), 1);
    assert_eq!(groups[0].events[0].event_id, "e3");
    assert_eq!(groups[1].events.len(), 2);
    assert_eq!(groups[1].area_name.as_deref(), Some("Server Room"));
}

#[tokio::test]
async fn failing_automation_service_does_not_abort() {
    let harness = Harness::new(ArmedState::ArmedAway, false).await;
    let processor = EventProcessor::new(
        Arc::clone(&harness.recorder),
        Arc::clone(&harness.channels),
        Arc::clone(&harness.automations),
        Arc::new(FailingAutomationService),
        harness.fetcher.clone(),
    );

    processor
        .process_and_persist_event(access_denied("e1"))
        .await
        .unwrap();

    // Persistence and alarm evaluation still happened
    assert!(harness.recorder.get_event("e1").await.unwrap().is_some());
    let area = harness.recorder.get_area("z1").await.unwrap().unwrap();
    assert_eq!(area.armed_state, ArmedState::Triggered);
}
