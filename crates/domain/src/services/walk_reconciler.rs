//! Walk reconciliation.
//!
//! Turns a stream of geofence events into walks. Each EXIT is held as the
//! pending exit for its (device, geozone) pair until the next ENTRY for the same
//! pair closes it:
//! 1. A newer EXIT replaces an unmatched one, which is dropped
//! 2. An ENTRY with no earlier pending EXIT is dropped
//! 3. EXITs still pending when the stream ends are dropped

use std::collections::HashMap;

use crate::models::{AlarmType, GeofenceEvent, Walk};

/// Pair EXIT/ENTRY events into walks.
///
/// Events are ordered by `created_at_ms` with a stable sort, so ties keep
/// their input order and repeated runs produce identical output.
pub fn reconcile(events: &[GeofenceEvent]) -> Vec<Walk> {
    let mut sorted: Vec<&GeofenceEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.created_at_ms);

    let mut pending_exits: HashMap<(&str, &str), &GeofenceEvent> = HashMap::new();
    let mut walks = Vec::new();
    let mut replaced_exits = 0usize;
    let mut orphan_entries = 0usize;

    for event in sorted {
        let key = event.zone_key();

        match event.alarm_type {
            AlarmType::Exit => {
                if pending_exits.insert(key, event).is_some() {
                    replaced_exits += 1;
                }
            }
            // An ENTRY closes the pending exit only when strictly later than it.
            AlarmType::Entry => match pending_exits.get(&key).copied() {
                Some(exit) if event.created_at_ms > exit.created_at_ms => {
                    pending_exits.remove(&key);
                    walks.push(Walk::from_events(exit.clone(), event.clone()));
                }
                _ => orphan_entries += 1,
            },
        }
    }

    let valid = walks.iter().filter(|w| w.is_valid).count();
    tracing::debug!(
        events = events.len(),
        walks = walks.len(),
        valid_walks = valid,
        invalid_walks = walks.len() - valid,
        replaced_exits,
        orphan_entries,
        unclosed_exits = pending_exits.len(),
        "Reconciled events into walks"
    );

    walks
}
