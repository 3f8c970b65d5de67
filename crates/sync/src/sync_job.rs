//! Monthly walk rewards sync job.
//!
//! One run reads a snapshot, rebuilds walks from the raw tracker events,
//! evaluates every active member for the target month and writes the results.

use chrono::{DateTime, Utc};
use domain::models::{parse_events, ChallengeRecord, MonthlyReward, User, Walk, YearMonth};
use domain::services::{
    attribute_walks, carry_forward_completed, group_by_month, group_by_user, reconcile, top_users,
    ChallengeCompletion, ChallengeEvaluator, DeviceDirectory, TopUser, WalkStatistics,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SyncError;
use crate::input::{self, Snapshot};
use crate::output::{OutputWriter, CHALLENGES_FILE, LEADERBOARD_FILE, REWARDS_FILE, WALKS_FILE};

/// Summary of a finished sync run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub period: String,
    pub events_received: usize,
    pub events_accepted: usize,
    pub events_rejected: usize,
    pub walks: usize,
    pub valid_walks: usize,
    pub attributed_walks: usize,
    pub unmapped_devices: usize,
    pub users_evaluated: usize,
    pub challenges: usize,
    /// Records from other periods carried into `challenges.json` unchanged.
    pub history_records: usize,
    pub challenges_completed: usize,
    pub total_reward: u32,
    pub completion: Vec<ChallengeCompletion>,
    pub duration_secs: f64,
}

/// Contents of `leaderboard.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardReport {
    pub period: String,
    pub top_users: Vec<TopUser>,
    pub completion: Vec<ChallengeCompletion>,
    pub statistics: WalkStatistics,
}

pub struct SyncJob {
    config: Config,
    evaluator: Arc<ChallengeEvaluator>,
    output: OutputWriter,
}

impl SyncJob {
    pub fn new(config: Config) -> Result<Self, SyncError> {
        let offset = config.utc_offset().ok_or_else(|| {
            SyncError::Config(format!(
                "utc_offset_minutes out of range: {}",
                config.evaluation.utc_offset_minutes
            ))
        })?;
        let evaluator = ChallengeEvaluator::default().with_utc_offset(offset);
        let output = OutputWriter::new(&config.output.directory, config.output.pretty);

        Ok(Self {
            config,
            evaluator: Arc::new(evaluator),
            output,
        })
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        self.run_at(Utc::now()).await
    }

    /// Run the sync as if the current time were `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let offset = self.evaluator.utc_offset();
        let period = self
            .config
            .target_period(now.with_timezone(&offset).date_naive())?;

        info!(period = %period, "Starting walk rewards sync");

        let Snapshot {
            users,
            events,
            challenges: mut previous,
        } = input::load_snapshot(&self.config.input.snapshot_path).await?;
        previous.extend(
            input::load_previous_challenges(self.config.input.previous_challenges_path.as_deref())
                .await?,
        );

        let events_received = events.len();
        let parsed = parse_events(events);
        if !parsed.rejected.is_empty() {
            warn!(rejected = parsed.rejected.len(), "Some tracker events were rejected");
        }

        let directory = DeviceDirectory::from_users(&users);
        let attribution = attribute_walks(reconcile(&parsed.events), &directory);
        if !attribution.unmapped_devices.is_empty() {
            warn!(
                count = attribution.unmapped_devices.len(),
                devices = ?attribution.unmapped_devices,
                "Walks recorded by devices with no registered owner"
            );
        }
        let attributed_walks = attribution.attributed_count();
        let walks = attribution.walks;

        let active: Vec<User> = users.into_iter().filter(|u| u.active).collect();
        let records = self.evaluate(&walks, &active, period, now).await?;
        let records = carry_forward_completed(records, &previous);
        let history = other_periods(&previous, period);

        let rewards: Vec<MonthlyReward> = active
            .iter()
            .map(|user| MonthlyReward::summarize_in(user, period, &records, &walks, &offset))
            .collect();

        let month_walks: Vec<Walk> = group_by_month(&walks, &offset)
            .remove(&period)
            .unwrap_or_default()
            .into_iter()
            .cloned()
            .collect();
        let completion = ChallengeCompletion::by_type(&records);
        let leaderboard = LeaderboardReport {
            period: period.to_string(),
            top_users: top_users(
                &active,
                &month_walks,
                &records,
                self.config.evaluation.leaderboard_size,
            ),
            completion: completion.clone(),
            statistics: WalkStatistics::from_walks(&month_walks),
        };

        self.output.write(WALKS_FILE, &walks).await?;
        let stored: Vec<&ChallengeRecord> = history.iter().chain(records.iter()).collect();
        self.output.write(CHALLENGES_FILE, &stored).await?;
        self.output.write(REWARDS_FILE, &rewards).await?;
        self.output.write(LEADERBOARD_FILE, &leaderboard).await?;

        let report = SyncReport {
            period: period.to_string(),
            events_received,
            events_accepted: parsed.events.len(),
            events_rejected: parsed.rejected.len(),
            walks: walks.len(),
            valid_walks: walks.iter().filter(|w| w.is_valid).count(),
            attributed_walks,
            unmapped_devices: attribution.unmapped_devices.len(),
            users_evaluated: active.len(),
            challenges: records.len(),
            history_records: history.len(),
            challenges_completed: records.iter().filter(|r| r.is_completed()).count(),
            total_reward: rewards.iter().map(|r| r.total_reward).sum(),
            completion,
            duration_secs: started.elapsed().as_secs_f64(),
        };

        crate::metrics::record_sync_report(&report);
        info!(
            period = %report.period,
            events = report.events_received,
            rejected = report.events_rejected,
            walks = report.walks,
            valid_walks = report.valid_walks,
            users = report.users_evaluated,
            challenges = report.challenges,
            completed = report.challenges_completed,
            total_reward = report.total_reward,
            output = %self.output.directory().display(),
            "Walk rewards sync completed"
        );

        Ok(report)
    }

    /// Evaluate each member on a blocking worker. Output keeps member order.
    async fn evaluate(
        &self,
        walks: &[Walk],
        users: &[User],
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChallengeRecord>, SyncError> {
        let mut by_user = group_by_user(walks);

        let handles: Vec<JoinHandle<Vec<ChallengeRecord>>> = users
            .iter()
            .map(|user| {
                let user_walks: Vec<Walk> = by_user
                    .remove(&user.id)
                    .unwrap_or_default()
                    .into_iter()
                    .cloned()
                    .collect();
                let user = user.clone();
                let evaluator = Arc::clone(&self.evaluator);
                tokio::task::spawn_blocking(move || {
                    evaluator.evaluate_all_at(&user_walks, &user, period, now)
                })
            })
            .collect();

        let mut records = Vec::new();
        for handle in handles {
            records.extend(handle.await?);
        }
        Ok(records)
    }
}

/// Stored records outside `period`, one per id. Later sources win, so the
/// previous-run file overrides the snapshot.
fn other_periods(previous: &[ChallengeRecord], period: YearMonth) -> Vec<ChallengeRecord> {
    let mut seen = HashSet::new();
    let mut kept: Vec<ChallengeRecord> = previous
        .iter()
        .rev()
        .filter(|r| !(r.year == period.year() && r.month == period.month()))
        .filter(|r| seen.insert(r.id))
        .cloned()
        .collect();
    kept.reverse();
    kept
}
