//! Leaderboard and challenge completion reporting.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{ChallengeRecord, ChallengeType, User, Walk};

/// Leaderboard size used when the caller has no preference.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Points a completed challenge adds to the leaderboard score.
pub const COMPLETED_CHALLENGE_SCORE: u32 = 10;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    /// 1-based position.
    pub rank: usize,
    pub user_id: String,
    pub tax_id: String,
    pub full_name: String,
    pub pet_name: String,
    pub total_walks: u32,
    pub total_challenges: u32,
    pub combined_score: u32,
}

/// Rank members by valid walks plus ten points per completed challenge.
///
/// Equal scores keep the order of `users`.
pub fn top_users(
    users: &[User],
    walks: &[Walk],
    challenges: &[ChallengeRecord],
    limit: usize,
) -> Vec<TopUser> {
    let mut walk_counts: HashMap<&str, u32> = HashMap::new();
    for walk in walks.iter().filter(|w| w.is_valid && w.is_attributed()) {
        *walk_counts.entry(walk.user_id.as_str()).or_insert(0) += 1;
    }

    let mut completed_counts: HashMap<&str, u32> = HashMap::new();
    for record in challenges.iter().filter(|r| r.is_completed()) {
        *completed_counts.entry(record.user_id.as_str()).or_insert(0) += 1;
    }

    let mut rows: Vec<TopUser> = users
        .iter()
        .map(|user| {
            let total_walks = walk_counts.get(user.id.as_str()).copied().unwrap_or(0);
            let total_challenges = completed_counts.get(user.id.as_str()).copied().unwrap_or(0);
            TopUser {
                rank: 0,
                user_id: user.id.clone(),
                tax_id: user.tax_id.clone(),
                full_name: user.full_name.clone(),
                pet_name: user.pet_name.clone(),
                total_walks,
                total_challenges,
                combined_score: total_walks + total_challenges * COMPLETED_CHALLENGE_SCORE,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.combined_score.cmp(&a.combined_score));
    rows.truncate(limit);
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index + 1;
    }
    rows
}

/// Completion figures for one challenge type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCompletion {
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub name: &'static str,
    pub total: u32,
    pub completed: u32,
    /// Percentage of records completed, 0 when there are none.
    pub completion_rate: f64,
}

impl ChallengeCompletion {
    /// One entry per challenge type, in `ChallengeType::ALL` order.
    pub fn by_type(records: &[ChallengeRecord]) -> Vec<Self> {
        ChallengeType::ALL
            .iter()
            .map(|challenge_type| {
                let (total, completed) = records
                    .iter()
                    .filter(|r| r.challenge_type == *challenge_type)
                    .fold((0u32, 0u32), |(total, completed), r| {
                        (total + 1, completed + u32::from(r.is_completed()))
                    });

                let completion_rate = if total == 0 {
                    0.0
                } else {
                    f64::from(completed) * 100.0 / f64::from(total)
                };

                Self {
                    challenge_type: *challenge_type,
                    name: challenge_type.display_name(),
                    total,
                    completed,
                    completion_rate,
                }
            })
            .collect()
    }
}
