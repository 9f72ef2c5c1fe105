//! Stream entry and domain record definitions.
//!
//! `RawStreamEntry` is the broker-native unit: an opaque id plus flat
//! field/value pairs. The decode step in the consumer crate turns it into a
//! `StreamRecord` variant; entries that cannot be decoded are discarded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default record tag for normalized events
pub const INTERACTION_KIND: &str = "interaction";

/// Record tag that reinterprets the wire shape as a burnout alert
pub const BURNOUT_ALERT_KIND: &str = "burnout_alert";

/// Broker-native stream entry: id plus flat field/value string pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStreamEntry {
    /// Broker-assigned, monotonically increasing identifier
    pub id: String,
    /// Flat field list; ordering is client-defined at the broker boundary,
    /// consumers must go through `field_map` rather than rely on position
    pub fields: Vec<(String, String)>,
}

impl RawStreamEntry {
    /// Create a new entry
    pub fn new(id: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Collapse the field list into a lookup map.
    ///
    /// On duplicate field names within the list the last value wins.
    pub fn field_map(&self) -> HashMap<&str, &str> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }
}

/// Normalized learner-interaction record forwarded to the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub id: String,
    pub user_id: String,
    /// Free-text interaction payload
    pub content: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Record tag, `"interaction"` unless the producer says otherwise
    #[serde(rename = "type")]
    pub kind: String,
}

/// Burnout alert derived from an entry tagged `burnout_alert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnoutAlert {
    pub user_id: String,
    /// Carried in the raw `content` field by convention
    pub risk_level: String,
    /// The raw entry id, for tracing the alert back to the stream
    pub correlation_id: String,
    /// Epoch milliseconds
    pub observed_at: i64,
}

/// Decoded stream record, discriminated by the wire `type` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRecord {
    /// Regular interaction, routed to the bulk channel
    Interaction(InteractionEvent),
    /// Burnout alert, routed to the alert channel
    Alert(BurnoutAlert),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_last_value_wins() {
        let entry = RawStreamEntry::new(
            "1-0",
            vec![
                ("userId".to_string(), "u1".to_string()),
                ("userId".to_string(), "u2".to_string()),
            ],
        );
        assert_eq!(entry.field_map().get("userId"), Some(&"u2"));
    }

    #[test]
    fn test_interaction_event_wire_names() {
        let event = InteractionEvent {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            content: "finished lesson".to_string(),
            timestamp: 1_700_000_000_000,
            kind: INTERACTION_KIND.to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["type"], "interaction");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_burnout_alert_wire_names() {
        let alert = BurnoutAlert {
            user_id: "u1".to_string(),
            risk_level: "high".to_string(),
            correlation_id: "1-0".to_string(),
            observed_at: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["riskLevel"], "high");
        assert_eq!(json["correlationId"], "1-0");
        assert_eq!(json["observedAt"], 1_700_000_000_000i64);
    }
}
