//! Reward table and monthly reward reporting models.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::challenge::{ChallengeRecord, ChallengeType, YearMonth};
use super::user::{PetPlan, User};
use super::walk::Walk;

/// Points paid per completed challenge, keyed by challenge type and plan tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardTable {
    rewards: HashMap<(ChallengeType, PetPlan), u32>,
}

impl RewardTable {
    /// Empty table; every lookup yields zero until amounts are set.
    pub fn empty() -> Self {
        Self {
            rewards: HashMap::new(),
        }
    }

    /// Set the amount for one challenge type and tier.
    pub fn with_reward(mut self, challenge_type: ChallengeType, plan: PetPlan, amount: u32) -> Self {
        self.rewards.insert((challenge_type, plan), amount);
        self
    }

    /// Amount paid when `challenge_type` is completed by a member on `plan`.
    pub fn reward_for(&self, challenge_type: ChallengeType, plan: PetPlan) -> u32 {
        self.rewards
            .get(&(challenge_type, plan))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for RewardTable {
    /// The program's published points table.
    fn default() -> Self {
        let tiers = |basic: u32, premium: u32| {
            [
                (PetPlan::Pet1, basic),
                (PetPlan::Pet2, basic),
                (PetPlan::Pet3, premium),
                (PetPlan::PetVital, premium),
            ]
        };

        let mut table = Self::empty();
        for (challenge_type, basic, premium) in [
            (ChallengeType::WeeklyThreeWalks, 50, 70),
            (ChallengeType::Consistency60, 40, 60),
            (ChallengeType::Monthly90, 50, 70),
            (ChallengeType::LongWalks, 50, 70),
        ] {
            for (plan, amount) in tiers(basic, premium) {
                table = table.with_reward(challenge_type, plan, amount);
            }
        }
        table
    }
}

/// One challenge line on a monthly reward report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardLine {
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub completed: bool,
    pub reward: u32,
}

/// Rewards earned by one member in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReward {
    pub user_id: String,
    pub tax_id: String,
    pub full_name: String,
    pub pet_name: String,
    pub month: u32,
    pub year: i32,
    pub challenges: Vec<RewardLine>,
    pub total_reward: u32,
    pub total_walks_in_month: u32,
}

impl MonthlyReward {
    /// Summarize a member's records and walks for `period` using UTC dates.
    pub fn summarize(
        user: &User,
        period: YearMonth,
        records: &[ChallengeRecord],
        walks: &[Walk],
    ) -> Self {
        Self::summarize_in(user, period, records, walks, &Utc.fix())
    }

    /// Summarize a member's records and walks for `period`.
    ///
    /// Records and walks for other members or months are ignored. Walks are
    /// bucketed by their start date in `offset`.
    pub fn summarize_in(
        user: &User,
        period: YearMonth,
        records: &[ChallengeRecord],
        walks: &[Walk],
        offset: &FixedOffset,
    ) -> Self {
        let challenges: Vec<RewardLine> = records
            .iter()
            .filter(|r| r.user_id == user.id && r.period() == Some(period))
            .map(|r| RewardLine {
                challenge_type: r.challenge_type,
                completed: r.is_completed(),
                reward: r.reward,
            })
            .collect();

        let total_walks_in_month = walks
            .iter()
            .filter(|w| w.user_id == user.id && w.is_valid && period.contains(w.start_date(offset)))
            .count() as u32;

        Self {
            user_id: user.id.clone(),
            tax_id: user.tax_id.clone(),
            full_name: user.full_name.clone(),
            pet_name: user.pet_name.clone(),
            month: period.month(),
            year: period.year(),
            total_reward: challenges.iter().map(|c| c.reward).sum(),
            challenges,
            total_walks_in_month,
        }
    }
}
