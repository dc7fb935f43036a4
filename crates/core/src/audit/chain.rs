//! Hash computation and chain verification.
//!
//! `hash = sha256(canonical(payload) || previous_hash)`, hex-encoded.
//! The first entry of a scope hashes the payload alone. Canonical JSON
//! orders object keys lexicographically at every depth so the same payload
//! always produces the same bytes, whatever the serializer's field order.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::types::{ChainEntry, ChainReport};

/// Renders a JSON value in canonical form: object keys sorted, no
/// insignificant whitespace.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonical_json(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", rendered.join(","))
        }
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Computes the chain hash for a canonical payload and the previous hash.
#[must_use]
pub fn chain_hash(canonical_payload: &str, previous_hash: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_payload.as_bytes());
    if let Some(prev) = previous_hash {
        hasher.update(prev.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Walks a scope's entries in order, recomputing every hash.
///
/// Checks three things per entry: the back link matches the prior entry's
/// stored hash, the first entry has no back link, and the stored hash
/// equals the recomputed one. Stops at the first mismatch.
#[must_use]
pub fn verify(entries: &[ChainEntry]) -> ChainReport {
    let mut prev_hash: Option<&str> = None;

    for (index, entry) in entries.iter().enumerate() {
        let expected_prev = prev_hash.map(str::to_owned);
        if entry.previous_hash != expected_prev {
            return ChainReport::Broken {
                first_bad_seq: entry.seq,
                detail: if index == 0 {
                    "first entry must have no previous hash".to_string()
                } else {
                    "previous-hash link does not match prior entry".to_string()
                },
            };
        }

        let recomputed = chain_hash(
            &entry.event.canonical_payload(),
            entry.previous_hash.as_deref(),
        );
        if recomputed != entry.hash {
            return ChainReport::Broken {
                first_bad_seq: entry.seq,
                detail: "stored hash does not match recomputed payload hash".to_string(),
            };
        }

        prev_hash = Some(&entry.hash);
    }

    ChainReport::Valid {
        entries: entries.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::{AuditEvent, AuditSeverity};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn event(action: &str) -> AuditEvent {
        AuditEvent {
            category: "settlement".to_string(),
            event_type: "deposit_released".to_string(),
            severity: AuditSeverity::Info,
            action: action.to_string(),
            amount: Some(dec!(350)),
            metadata: json!({ "wallet_portion": "200", "card_portion": "150" }),
        }
    }

    fn build_chain(actions: &[&str]) -> Vec<ChainEntry> {
        let mut entries = Vec::with_capacity(actions.len());
        let mut prev: Option<String> = None;
        for (seq, action) in actions.iter().enumerate() {
            let ev = event(action);
            let hash = chain_hash(&ev.canonical_payload(), prev.as_deref());
            entries.push(ChainEntry {
                seq: i64::try_from(seq).unwrap(),
                event: ev,
                hash: hash.clone(),
                previous_hash: prev,
            });
            prev = Some(hash);
        }
        entries
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({ "b": 1, "a": { "z": true, "y": [2, 1] } });
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"y":[2,1],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_canonical_json_key_order_irrelevant() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn test_chain_hash_depends_on_previous() {
        let h1 = chain_hash("payload", None);
        let h2 = chain_hash("payload", Some(&h1));
        assert_ne!(h1, h2);
        // Deterministic for the same inputs.
        assert_eq!(chain_hash("payload", Some(&h1)), h2);
    }

    #[test]
    fn test_verify_valid_chain() {
        let entries = build_chain(&["approved", "wallet credited", "card refunded"]);
        assert_eq!(verify(&entries), ChainReport::Valid { entries: 3 });
    }

    #[test]
    fn test_verify_empty_chain() {
        assert_eq!(verify(&[]), ChainReport::Valid { entries: 0 });
    }

    #[test]
    fn test_tampered_payload_detected() {
        let mut entries = build_chain(&["approved", "wallet credited", "card refunded"]);
        entries[1].event.amount = Some(dec!(9999));

        let report = verify(&entries);
        assert_eq!(
            report,
            ChainReport::Broken {
                first_bad_seq: 1,
                detail: "stored hash does not match recomputed payload hash".to_string(),
            }
        );
    }

    #[test]
    fn test_broken_link_detected() {
        let mut entries = build_chain(&["approved", "wallet credited"]);
        entries[1].previous_hash = Some("0".repeat(64));

        let report = verify(&entries);
        assert!(matches!(
            report,
            ChainReport::Broken { first_bad_seq: 1, .. }
        ));
    }

    #[test]
    fn test_first_entry_must_have_no_previous() {
        let mut entries = build_chain(&["approved"]);
        entries[0].previous_hash = Some("0".repeat(64));

        assert!(matches!(
            verify(&entries),
            ChainReport::Broken { first_bad_seq: 0, .. }
        ));
    }
}
