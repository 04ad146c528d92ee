//! Organization-scoped pub/sub channels for Fusion
//!
//! This crate provides the EventChannels broker. The event processor
//! publishes serialized real-time messages to per-organization channels;
//! dashboards and notification workers subscribe. The thumbnail gate uses
//! subscriber-count introspection to skip work nobody is listening for.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default channel capacity for subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Broker for organization-scoped broadcast channels
///
/// Channels are created lazily on first subscribe or publish. Publishing is
/// fire-and-forget: a send error only means the channel has no active
/// receivers, which is normal.
pub struct EventChannels {
    /// Map of channel names to their broadcast senders
    channels: DashMap<String, broadcast::Sender<serde_json::Value>>,
    /// Channel capacity
    capacity: usize,
}

impl EventChannels {
    /// Create a new broker
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new broker with specified channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<serde_json::Value> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            })
            .clone()
    }

    /// Subscribe to a channel
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<serde_json::Value> {
        trace!(channel, "Subscribing to channel");
        self.sender(channel).subscribe()
    }

    /// Publish a message to a channel
    ///
    /// Returns the number of receivers the message was delivered to.
    pub fn publish(&self, channel: &str, message: serde_json::Value) -> usize {
        debug!(channel, "Publishing message");
        match self.channels.get(channel) {
            Some(sender) => sender.send(message).unwrap_or(0),
            // No channel yet means nobody has subscribed
            None => 0,
        }
    }

    /// Count of live subscribers on a channel
    ///
    /// The thumbnail gate uses this the way Redis NUMSUB is used: a count of
    /// zero means enriched payloads would be wasted.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Number of channels that have been created
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for EventChannels {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for EventChannels
pub type SharedEventChannels = Arc<EventChannels>;

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_core::{base_event_channel, thumbnail_event_channel};
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let channels = EventChannels::new();
        let name = base_event_channel("org1");
        let mut rx = channels.subscribe(&name);

        let delivered = channels.publish(&name, json!({"eventId": "e1"}));
        assert_eq!(delivered, 1);

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg["eventId"], "e1");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let channels = EventChannels::new();
        let delivered = channels.publish("org:org1:events", json!({"n": 1}));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_subscriber_count() {
        let channels = EventChannels::new();
        let name = thumbnail_event_channel("org1");

        assert_eq!(channels.subscriber_count(&name), 0);

        let _rx1 = channels.subscribe(&name);
        let _rx2 = channels.subscribe(&name);
        assert_eq!(channels.subscriber_count(&name), 2);

        drop(_rx1);
        assert_eq!(channels.subscriber_count(&name), 1);
    }

    #[tokio::test]
    async fn test_channels_are_isolated_per_org() {
        let channels = EventChannels::new();
        let mut rx_a = channels.subscribe("org:a:events");
        let mut rx_b = channels.subscribe("org:b:events");

        channels.publish("org:a:events", json!({"org": "a"}));

        let msg = rx_a.recv().await.unwrap();
        assert_eq!(msg["org"], "a");
        assert!(rx_b.try_recv().is_err());
    }
}
