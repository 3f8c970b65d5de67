//! Domain services for walk rewards.
//!
//! Services contain business logic that operates on domain models. All of it is
//! pure and synchronous; callers decide where it runs.

pub mod attribution;
pub mod calendar;
pub mod challenge_evaluator;
pub mod leaderboard;
pub mod walk_analytics;
pub mod walk_reconciler;

pub use attribution::{
    attribute_walks, AttributionOutcome, DeviceDirectory, DeviceLookup, DeviceOwner,
};
pub use calendar::{longest_streak, weeks_for_month, StreakSummary, WeekWindow};
pub use challenge_evaluator::{carry_forward_completed, ChallengeEvaluator};
pub use leaderboard::{
    top_users, ChallengeCompletion, TopUser, COMPLETED_CHALLENGE_SCORE, DEFAULT_LEADERBOARD_SIZE,
};
pub use walk_analytics::{filter_by_range, group_by_month, group_by_user, WalkStatistics};
pub use walk_reconciler::reconcile;
