//! Challenge evaluation.
//!
//! Computes the four monthly challenges for one member from their walks:
//! - weekly_three_walks: 3+ walks on every day of a Monday–Sunday week
//! - consistency_60: 60 walks in a streak with no day missing
//! - monthly_90: 90 walks starting within the month
//! - long_walks: 3 walks of 15+ minutes in a streak with no day missing
//!
//! Only valid walks attributed to the member are considered. Evaluation holds
//! no state between calls, so members can be evaluated in parallel.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::{BTreeMap, HashMap};

use super::calendar::{longest_streak, weeks_for_month, WeekWindow};
use crate::models::{
    ChallengeKey, ChallengeMetadata, ChallengeRecord, ChallengeStatus, ChallengeType,
    RewardTable, User, Walk, YearMonth, REQUIRED_DAILY_WALKS,
};

/// Evaluates challenges against a reward table in a fixed calendar offset.
#[derive(Debug, Clone)]
pub struct ChallengeEvaluator {
    rewards: RewardTable,
    offset: FixedOffset,
}

impl Default for ChallengeEvaluator {
    fn default() -> Self {
        Self::new(RewardTable::default())
    }
}

impl ChallengeEvaluator {
    /// Evaluator using UTC calendar days.
    pub fn new(rewards: RewardTable) -> Self {
        Self {
            rewards,
            offset: Utc.fix(),
        }
    }

    /// Use a different UTC offset to decide which calendar day a walk falls on.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.offset
    }

    /// Evaluate all four challenges for `user` in `period`, stamped with the current time.
    pub fn evaluate_all(
        &self,
        walks: &[Walk],
        user: &User,
        period: YearMonth,
    ) -> Vec<ChallengeRecord> {
        self.evaluate_all_at(walks, user, period, Utc::now())
    }

    /// Evaluate all four challenges, stamping completions with `now`.
    ///
    /// Weekly records come first (one per week), then consistency, monthly and
    /// long walks.
    pub fn evaluate_all_at(
        &self,
        walks: &[Walk],
        user: &User,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeRecord> {
        let mut records = self.evaluate_weekly(walks, user, period, now);
        records.push(self.evaluate_consistency(walks, user, period, now));
        records.push(self.evaluate_monthly(walks, user, period, now));
        records.push(self.evaluate_long_walks(walks, user, period, now));

        tracing::debug!(
            user_id = %user.id,
            period = %period,
            records = records.len(),
            completed = records.iter().filter(|r| r.is_completed()).count(),
            "Evaluated challenges"
        );

        records
    }

    /// Evaluate every member in `users` for `period`.
    pub fn evaluate_month(
        &self,
        walks: &[Walk],
        users: &[User],
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeRecord> {
        users
            .iter()
            .flat_map(|user| self.evaluate_all_at(walks, user, period, now))
            .collect()
    }

    /// Weekly challenge: one record per week whose Sunday is in `period`.
    pub fn evaluate_weekly(
        &self,
        walks: &[Walk],
        user: &User,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> Vec<ChallengeRecord> {
        let mut walks_per_day: HashMap<NaiveDate, u32> = HashMap::new();
        for date in self.eligible_dates(walks, user, |_| true) {
            *walks_per_day.entry(date).or_insert(0) += 1;
        }

        weeks_for_month(period)
            .into_iter()
            .map(|week| self.weekly_record(&walks_per_day, week, user, period, now))
            .collect()
    }

    fn weekly_record(
        &self,
        walks_per_day: &HashMap<NaiveDate, u32>,
        week: WeekWindow,
        user: &User,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> ChallengeRecord {
        let daily_walks: BTreeMap<NaiveDate, u32> = week
            .days()
            .map(|day| (day, walks_per_day.get(&day).copied().unwrap_or(0)))
            .collect();

        let qualifying_days = daily_walks
            .values()
            .filter(|count| **count as usize >= REQUIRED_DAILY_WALKS)
            .count() as u32;

        self.build_record(
            user,
            ChallengeType::WeeklyThreeWalks,
            period,
            qualifying_days,
            Some(ChallengeMetadata::Weekly {
                week_number: week.number,
                week_start_date: week.start,
                week_end_date: week.end,
                daily_walks,
            }),
            now,
        )
    }

    /// Consistency challenge over the member's entire walk history.
    pub fn evaluate_consistency(
        &self,
        walks: &[Walk],
        user: &User,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> ChallengeRecord {
        let streak = longest_streak(self.eligible_dates(walks, user, |_| true));

        self.build_record(
            user,
            ChallengeType::Consistency60,
            period,
            streak.walks,
            Some(ChallengeMetadata::Consistency {
                consecutive_days: streak.longest_days,
                last_walk_date: streak.last_date,
            }),
            now,
        )
    }

    /// Monthly challenge: walks starting within `period`, gaps allowed.
    pub fn evaluate_monthly(
        &self,
        walks: &[Walk],
        user: &User,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> ChallengeRecord {
        let count = self
            .eligible_dates(walks, user, |_| true)
            .into_iter()
            .filter(|date| period.contains(*date))
            .count() as u32;

        self.build_record(user, ChallengeType::Monthly90, period, count, None, now)
    }

    /// Long walks challenge: streak of walks lasting 15 minutes or more.
    ///
    /// Shorter walks are filtered out before the scan, so they never break a
    /// streak.
    pub fn evaluate_long_walks(
        &self,
        walks: &[Walk],
        user: &User,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> ChallengeRecord {
        let streak = longest_streak(self.eligible_dates(walks, user, Walk::is_long));

        self.build_record(
            user,
            ChallengeType::LongWalks,
            period,
            streak.walks,
            Some(ChallengeMetadata::LongWalks {
                consecutive_long_walks: streak.walks,
                last_long_walk_date: streak.last_date,
            }),
            now,
        )
    }

    /// Start dates of the member's valid walks passing `include`, in walk order.
    fn eligible_dates<F>(&self, walks: &[Walk], user: &User, include: F) -> Vec<NaiveDate>
    where
        F: Fn(&Walk) -> bool,
    {
        let mut eligible: Vec<&Walk> = walks
            .iter()
            .filter(|w| w.is_valid && w.user_id == user.id && include(*w))
            .collect();
        eligible.sort_by_key(|w| w.start_time);

        eligible
            .into_iter()
            .map(|w| w.start_date(&self.offset))
            .collect()
    }

    fn build_record(
        &self,
        user: &User,
        challenge_type: ChallengeType,
        period: YearMonth,
        progress: u32,
        metadata: Option<ChallengeMetadata>,
        now: DateTime<Utc>,
    ) -> ChallengeRecord {
        let target = challenge_type.target();
        let status = ChallengeStatus::from_progress(progress, target);
        let completed = status == ChallengeStatus::Completed;

        let key = ChallengeKey {
            user_id: user.id.clone(),
            challenge_type,
            period,
            week_start: metadata.as_ref().and_then(|m| m.week_start()),
        };

        ChallengeRecord {
            id: key.record_id(),
            user_id: user.id.clone(),
            user_tax_id: user.tax_id.clone(),
            challenge_type,
            month: period.month(),
            year: period.year(),
            status,
            progress,
            target,
            reward: if completed {
                self.rewards.reward_for(challenge_type, user.pet_plan)
            } else {
                0
            },
            completed_at: completed.then_some(now),
            metadata,
        }
    }
}

/// Keep previously completed records untouched when re-evaluating.
///
/// A fresh record whose slot was already completed in `previous` is replaced
/// by the stored one, preserving its `completed_at` and reward. Everything else
/// is returned as evaluated.
pub fn carry_forward_completed(
    records: Vec<ChallengeRecord>,
    previous: &[ChallengeRecord],
) -> Vec<ChallengeRecord> {
    let completed: HashMap<ChallengeKey, &ChallengeRecord> = previous
        .iter()
        .filter(|r| r.is_completed())
        .filter_map(|r| r.key().map(|k| (k, r)))
        .collect();

    records
        .into_iter()
        .map(|record| {
            match record.key().and_then(|k| completed.get(&k)) {
                Some(stored) => (*stored).clone(),
                None => record,
            }
        })
        .collect()
}
