//! Temporal/spatial event clustering for timeline display
//!
//! Groups a list of events into clusters of related activity: same area,
//! close in time. Grouping is recomputed fresh on every call and holds no
//! state; the output is for rendering, never persisted.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use fusion_core::TimelineEvent;

/// Clustering window configuration
///
/// Two thresholds: a tighter window for events from the same device (rapid
/// re-reports of one sensor) and a wider default for cross-device activity
/// in the same area.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Window applied when the candidate's device differs from every
    /// current member, in seconds
    pub default_window_secs: i64,

    /// Window applied when the candidate shares a device with any current
    /// member, in seconds
    pub same_device_window_secs: i64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            default_window_secs: 90,
            same_device_window_secs: 15,
        }
    }
}

impl ClusterConfig {
    fn default_window(&self) -> Duration {
        Duration::seconds(self.default_window_secs)
    }

    fn same_device_window(&self) -> Duration {
        Duration::seconds(self.same_device_window_secs)
    }
}

/// A cluster of related events
///
/// The area is fixed at seed time and never changes; members are sorted
/// chronologically ascending.
#[derive(Debug, Clone, Serialize)]
pub struct EventGroup {
    /// Stable key for rendering ("<area-or-none>:<seed event id>")
    pub group_key: String,

    /// Earliest member timestamp
    pub start_time: DateTime<Utc>,

    /// Latest member timestamp
    pub end_time: DateTime<Utc>,

    /// Required area for membership
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    /// Display name of the area
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,

    /// Member events, chronological ascending
    pub events: Vec<TimelineEvent>,
}

/// Group events into spatial/temporal clusters
///
/// Events are visited newest first; each unassigned event seeds a group
/// whose required area is the seed's (or "no area"). Repeated passes pull in
/// unassigned events whose area matches and whose time distance to the
/// group's accumulated `[earliest, latest]` boundary is within the window:
/// the tighter same-device window when the candidate shares a device with a
/// member, the default window otherwise. Passes repeat until a full scan
/// adds nothing, so chains of closely spaced events extend the boundary
/// transitively. Groups come back sorted by `end_time` descending.
pub fn cluster_events_by_proximity(
    events: &[TimelineEvent],
    config: &ClusterConfig,
) -> Vec<EventGroup> {
    let mut order: Vec<usize> = (0..events.len()).collect();
    // Stable: ties keep original input order
    order.sort_by(|&a, &b| events[b].timestamp.cmp(&events[a].timestamp));

    let mut assigned = vec![false; events.len()];
    let mut groups = Vec::with_capacity(events.len());

    for &seed_idx in &order {
        if assigned[seed_idx] {
            continue;
        }
        assigned[seed_idx] = true;

        let seed = &events[seed_idx];
        let area_id = seed.area_id.clone();
        let mut members = vec![seed_idx];
        let mut earliest = seed.timestamp;
        let mut latest = seed.timestamp;
        let mut member_devices: HashSet<&str> =
            HashSet::from([seed.device_external_id.as_str()]);

        // Re-scan until a full pass adds nothing; each addition can widen
        // the boundary and admit further events.
        loop {
            let mut added = false;
            for &idx in &order {
                if assigned[idx] {
                    continue;
                }
                let candidate = &events[idx];
                if candidate.area_id != area_id {
                    continue;
                }

                let window = if member_devices.contains(candidate.device_external_id.as_str()) {
                    config.same_device_window()
                } else {
                    config.default_window()
                };

                let distance = if candidate.timestamp < earliest {
                    earliest - candidate.timestamp
                } else if candidate.timestamp > latest {
                    candidate.timestamp - latest
                } else {
                    Duration::zero()
                };

                if distance <= window {
                    assigned[idx] = true;
                    members.push(idx);
                    earliest = earliest.min(candidate.timestamp);
                    latest = latest.max(candidate.timestamp);
                    member_devices.insert(candidate.device_external_id.as_str());
                    added = true;
                }
            }
            if !added {
                break;
            }
        }

        // Chronological ascending, ties by original input order
        members.sort_by(|&a, &b| {
            events[a]
                .timestamp
                .cmp(&events[b].timestamp)
                .then(a.cmp(&b))
        });

        trace!(
            seed = %seed.event_id,
            members = members.len(),
            "Built event group"
        );

        groups.push(EventGroup {
            group_key: format!(
                "{}:{}",
                area_id.as_deref().unwrap_or("none"),
                seed.event_id
            ),
            start_time: earliest,
            end_time: latest,
            area_id,
            area_name: seed.area_name.clone(),
            events: members.iter().map(|&i| events[i].clone()).collect(),
        });
    }

    groups.sort_by(|a, b| b.end_time.cmp(&a.end_time));
    groups
}
