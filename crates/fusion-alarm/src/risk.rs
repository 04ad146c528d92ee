//! Security-risk classification
//!
//! Pure predicate over the event taxonomy and a device snapshot. The
//! evaluator takes any implementation so a host can swap in tenant-specific
//! rules for zones with custom trigger behavior.

use fusion_core::{Device, EventCategory, EventSubtype, EventType, StandardizedEvent};

/// Classifies whether an event is a security risk for a device
///
/// Implementations must be pure: same event + device snapshot, same answer,
/// no side effects.
pub trait RiskClassifier: Send + Sync {
    fn is_security_risk(&self, event: &StandardizedEvent, device: &Device) -> bool;
}

/// The built-in rule table
///
/// Forced/held doors, intrusion, unauthenticated access denials, and
/// analytics detections from security-class devices count as risk. Routine
/// state changes and diagnostics never do.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRiskRules;

impl RiskClassifier for StandardRiskRules {
    fn is_security_risk(&self, event: &StandardizedEvent, device: &Device) -> bool {
        match event.event_type {
            EventType::DoorForcedOpen | EventType::DoorHeldOpen | EventType::Intrusion => true,

            EventType::AccessDenied => matches!(
                event.subtype,
                Some(EventSubtype::InvalidCredential)
                    | Some(EventSubtype::ExpiredCredential)
                    | Some(EventSubtype::AntipassbackViolation)
            ),

            EventType::MotionDetected | EventType::ObjectDetected | EventType::LineCrossed => {
                event.category == EventCategory::Analytics && device.kind.is_security_class()
            }

            _ => false,
        }
    }
}
