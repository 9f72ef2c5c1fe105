//! Fail-closed normalization of raw stream entries.
//!
//! The broker's flat field list decodes into a tagged `StreamRecord`; an
//! entry without the required fields yields `None` and is discarded by the
//! caller, never retried.

use contracts::{
    now_millis, BurnoutAlert, InteractionEvent, RawStreamEntry, StreamRecord, BURNOUT_ALERT_KIND,
    INTERACTION_KIND,
};

/// Decode one raw entry into a domain record.
///
/// Requirements and defaults:
/// - `userId` and `content` must be present and non-empty, otherwise `None`
/// - `id` defaults to the broker entry id
/// - `timestamp` parses as epoch millis, falling back to the current time
/// - `type` defaults to `"interaction"`; `"burnout_alert"` reinterprets the
///   shape as an alert with `riskLevel` taken from `content` and
///   `correlationId` from the broker entry id
pub fn decode_entry(entry: &RawStreamEntry) -> Option<StreamRecord> {
    let fields = entry.field_map();

    let user_id = non_empty(fields.get("userId").copied())?;
    let content = non_empty(fields.get("content").copied())?;

    let timestamp = fields
        .get("timestamp")
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or_else(now_millis);

    let kind = non_empty(fields.get("type").copied()).unwrap_or(INTERACTION_KIND);

    if kind == BURNOUT_ALERT_KIND {
        return Some(StreamRecord::Alert(BurnoutAlert {
            user_id: user_id.to_string(),
            risk_level: content.to_string(),
            correlation_id: entry.id.clone(),
            observed_at: timestamp,
        }));
    }

    let id = non_empty(fields.get("id").copied()).unwrap_or(&entry.id);

    Some(StreamRecord::Interaction(InteractionEvent {
        id: id.to_string(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        timestamp,
        kind: kind.to_string(),
    }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, fields: &[(&str, &str)]) -> RawStreamEntry {
        RawStreamEntry::new(
            id,
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_valid_entry_decodes_to_interaction() {
        let raw = entry(
            "5-1",
            &[
                ("userId", "u1"),
                ("content", "completed module 3"),
                ("timestamp", "1700000000000"),
            ],
        );

        let Some(StreamRecord::Interaction(event)) = decode_entry(&raw) else {
            panic!("expected interaction record");
        };

        assert_eq!(event.id, "5-1"); // defaults to the entry id
        assert_eq!(event.user_id, "u1");
        assert_eq!(event.timestamp, 1_700_000_000_000);
        assert_eq!(event.kind, INTERACTION_KIND);
    }

    #[test]
    fn test_explicit_id_field_wins() {
        let raw = entry(
            "5-1",
            &[("id", "evt-42"), ("userId", "u1"), ("content", "x")],
        );

        let Some(StreamRecord::Interaction(event)) = decode_entry(&raw) else {
            panic!("expected interaction record");
        };
        assert_eq!(event.id, "evt-42");
    }

    #[test]
    fn test_missing_user_id_fails_closed() {
        let raw = entry("5-1", &[("content", "orphan")]);
        assert!(decode_entry(&raw).is_none());
    }

    #[test]
    fn test_empty_content_fails_closed() {
        let raw = entry("5-1", &[("userId", "u1"), ("content", "")]);
        assert!(decode_entry(&raw).is_none());
    }

    #[test]
    fn test_burnout_tag_reinterprets_fields() {
        let raw = entry(
            "7-0",
            &[
                ("userId", "u1"),
                ("content", "high"),
                ("type", "burnout_alert"),
                ("timestamp", "1700000000000"),
            ],
        );

        let Some(StreamRecord::Alert(alert)) = decode_entry(&raw) else {
            panic!("expected alert record");
        };

        assert_eq!(alert.user_id, "u1");
        assert_eq!(alert.risk_level, "high");
        assert_eq!(alert.correlation_id, "7-0");
        assert_eq!(alert.observed_at, 1_700_000_000_000);
    }

    #[test]
    fn test_unparseable_timestamp_falls_back_to_now() {
        let before = now_millis();
        let raw = entry(
            "5-1",
            &[("userId", "u1"), ("content", "x"), ("timestamp", "soon")],
        );

        let Some(StreamRecord::Interaction(event)) = decode_entry(&raw) else {
            panic!("expected interaction record");
        };
        assert!(event.timestamp >= before);
    }
}
