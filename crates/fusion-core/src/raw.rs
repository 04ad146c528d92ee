//! Raw event type sniffing
//!
//! Each vendor wraps its native event type in a different payload shape.
//! The processor records this raw string alongside the standardized taxonomy
//! so the original classification is queryable later. Recognition is
//! best-effort: an unrecognized shape yields `None`, never an error.

use serde_json::Value;

/// Extract the vendor-native event type string from a raw payload
///
/// Recognized shapes, one per vendor family:
/// - YoLink: top-level `"event"` string
/// - Piko: top-level `"eventType"` string
/// - NetBox: nested `"Event"."ActivityType"` (string or integer)
/// - Genea: top-level `"action"` string
pub fn raw_event_type(original: &Value) -> Option<String> {
    let obj = original.as_object()?;

    if let Some(Value::String(s)) = obj.get("event") {
        return Some(s.clone());
    }

    if let Some(Value::String(s)) = obj.get("eventType") {
        return Some(s.clone());
    }

    if let Some(Value::Object(inner)) = obj.get("Event") {
        match inner.get("ActivityType") {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }

    if let Some(Value::String(s)) = obj.get("action") {
        return Some(s.clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yolink_shape() {
        let payload = json!({"event": "DoorSensor.Alert", "data": {"state": "open"}});
        assert_eq!(raw_event_type(&payload).as_deref(), Some("DoorSensor.Alert"));
    }

    #[test]
    fn test_piko_shape() {
        let payload = json!({"eventType": "analyticsSdkObjectDetected"});
        assert_eq!(
            raw_event_type(&payload).as_deref(),
            Some("analyticsSdkObjectDetected")
        );
    }

    #[test]
    fn test_netbox_nested_shape() {
        let payload = json!({"Event": {"ActivityType": 23}});
        assert_eq!(raw_event_type(&payload).as_deref(), Some("23"));

        let payload = json!({"Event": {"ActivityType": "AccessDenied"}});
        assert_eq!(raw_event_type(&payload).as_deref(), Some("AccessDenied"));
    }

    #[test]
    fn test_genea_shape() {
        let payload = json!({"action": "door.held_open"});
        assert_eq!(raw_event_type(&payload).as_deref(), Some("door.held_open"));
    }

    #[test]
    fn test_unknown_shape_is_none() {
        assert_eq!(raw_event_type(&json!({"foo": "bar"})), None);
        assert_eq!(raw_event_type(&json!(null)), None);
        assert_eq!(raw_event_type(&json!([1, 2])), None);
        // Non-string scalars in string positions are not coerced
        assert_eq!(raw_event_type(&json!({"event": 42})), None);
    }
}
