//! Alarm zone evaluation
//!
//! Classifies events as security risks and drives the zone arming state
//! machine. The only transition this crate performs is armed -> triggered;
//! arming and disarming are operator actions handled elsewhere.

mod risk;

pub use risk::{RiskClassifier, StandardRiskRules};

use thiserror::Error;
use tracing::{debug, info};

use fusion_core::{Area, ArmedState, Device, StandardizedEvent};
use fusion_recorder::{Recorder, RecorderError};

/// Errors from alarm evaluation
#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("recorder: {0}")]
    Recorder(#[from] RecorderError),
}

/// Result type for alarm operations
pub type AlarmResult<T> = Result<T, AlarmError>;

/// Evaluates events against their zone's arming state
///
/// Holds a risk classifier chosen by the host; zones with
/// `TriggerBehavior::Custom` are expected to be paired with a host-supplied
/// classifier implementation.
pub struct AlarmEvaluator<C: RiskClassifier> {
    classifier: C,
}

impl AlarmEvaluator<StandardRiskRules> {
    /// Evaluator with the built-in risk rule table
    pub fn standard() -> Self {
        Self::new(StandardRiskRules)
    }
}

impl<C: RiskClassifier> AlarmEvaluator<C> {
    /// Create an evaluator with the given classifier
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Access the classifier (for gate-level risk checks)
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Evaluate one event against its zone
    ///
    /// Returns the new armed state when a transition was persisted, `None`
    /// otherwise. Disarmed zones are never evaluated; a zone already in
    /// `Triggered` absorbs further risk events without a second write.
    pub async fn evaluate(
        &self,
        recorder: &Recorder,
        event: &StandardizedEvent,
        device: &Device,
        area: &Area,
    ) -> AlarmResult<Option<ArmedState>> {
        if !area.armed_state.is_armed() {
            debug!(area_id = %area.id, "Zone disarmed, skipping risk evaluation");
            return Ok(None);
        }

        if !self.classifier.is_security_risk(event, device) {
            return Ok(None);
        }

        if area.armed_state == ArmedState::Triggered {
            debug!(area_id = %area.id, event_id = %event.event_id, "Zone already triggered");
            return Ok(None);
        }

        recorder
            .set_area_armed_state(&area.id, ArmedState::Triggered)
            .await?;
        info!(
            area_id = %area.id,
            event_id = %event.event_id,
            from = area.armed_state.as_str(),
            "Zone triggered by security risk event"
        );
        Ok(Some(ArmedState::Triggered))
    }
}
