//! Sync run metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder these
//! calls are no-ops.

use metrics::{counter, gauge, histogram};

use crate::sync_job::SyncReport;

/// Record the counters of a finished sync run.
///
/// Records:
/// - `walk_rewards_events_total`: Counter with label `outcome` (accepted, rejected)
/// - `walk_rewards_walks_total`: Counter with label `valid` (true, false)
/// - `walk_rewards_challenges_total`: Counter with label `type`
/// - `walk_rewards_challenges_completed_total`: Counter with label `type`
/// - `walk_rewards_unmapped_devices`: Gauge
/// - `walk_rewards_sync_duration_seconds`: Histogram
pub fn record_sync_report(report: &SyncReport) {
    counter!("walk_rewards_events_total", "outcome" => "accepted")
        .increment(report.events_accepted as u64);
    counter!("walk_rewards_events_total", "outcome" => "rejected")
        .increment(report.events_rejected as u64);

    counter!("walk_rewards_walks_total", "valid" => "true").increment(report.valid_walks as u64);
    counter!("walk_rewards_walks_total", "valid" => "false")
        .increment((report.walks - report.valid_walks) as u64);

    for completion in &report.completion {
        let challenge_type = completion.challenge_type.as_str();
        counter!("walk_rewards_challenges_total", "type" => challenge_type)
            .increment(u64::from(completion.total));
        counter!("walk_rewards_challenges_completed_total", "type" => challenge_type)
            .increment(u64::from(completion.completed));
    }

    gauge!("walk_rewards_unmapped_devices").set(report.unmapped_devices as f64);
    histogram!("walk_rewards_sync_duration_seconds").record(report.duration_secs);
}
