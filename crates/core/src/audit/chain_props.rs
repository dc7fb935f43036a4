//! Property-based tests for audit chain integrity.

use proptest::prelude::*;
use serde_json::json;

use super::chain::{chain_hash, verify};
use super::types::{AuditEvent, AuditSeverity, ChainEntry, ChainReport};

fn event_strategy() -> impl Strategy<Value = AuditEvent> {
    ("[a-z_]{1,12}", "[a-z_]{1,12}", "[ -~]{0,40}", any::<u32>()).prop_map(
        |(category, event_type, action, marker)| AuditEvent {
            category,
            event_type,
            severity: AuditSeverity::Info,
            action,
            amount: None,
            metadata: json!({ "marker": marker }),
        },
    )
}

fn build_chain(events: Vec<AuditEvent>) -> Vec<ChainEntry> {
    let mut entries = Vec::with_capacity(events.len());
    let mut prev: Option<String> = None;
    for (seq, event) in events.into_iter().enumerate() {
        let hash = chain_hash(&event.canonical_payload(), prev.as_deref());
        entries.push(ChainEntry {
            seq: i64::try_from(seq).unwrap(),
            event,
            hash: hash.clone(),
            previous_hash: prev,
        });
        prev = Some(hash);
    }
    entries
}

proptest! {
    /// A freshly built chain always verifies.
    #[test]
    fn prop_built_chain_verifies(events in prop::collection::vec(event_strategy(), 0..12)) {
        let entries = build_chain(events);
        prop_assert!(verify(&entries).is_valid());
    }

    /// Mutating any stored entry's payload is detected, and the first
    /// reported failure is exactly the mutated entry.
    #[test]
    fn prop_payload_mutation_detected(
        events in prop::collection::vec(event_strategy(), 1..12),
        victim_index in any::<prop::sample::Index>(),
    ) {
        let mut entries = build_chain(events);
        let victim = victim_index.index(entries.len());
        entries[victim].event.action.push('!');

        match verify(&entries) {
            ChainReport::Broken { first_bad_seq, .. } => {
                prop_assert_eq!(first_bad_seq, i64::try_from(victim).unwrap());
            }
            ChainReport::Valid { .. } => prop_assert!(false, "mutation went undetected"),
        }
    }

    /// Dropping an interior entry breaks the back link of its successor.
    #[test]
    fn prop_removed_entry_detected(
        events in prop::collection::vec(event_strategy(), 3..12),
        victim_index in any::<prop::sample::Index>(),
    ) {
        let mut entries = build_chain(events);
        // Never remove the last entry; truncation of the tail is not
        // detectable by link checks alone.
        let victim = victim_index.index(entries.len() - 1);
        entries.remove(victim);

        prop_assert!(!verify(&entries).is_valid());
    }
}
