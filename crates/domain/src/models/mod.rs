//! Domain models for walk rewards.

pub mod challenge;
pub mod geofence_event;
pub mod reward;
pub mod user;
pub mod walk;

pub use challenge::{
    ChallengeError, ChallengeKey, ChallengeMetadata, ChallengeRecord, ChallengeStatus,
    ChallengeType, YearMonth, REQUIRED_CONSECUTIVE_LONG_WALKS, REQUIRED_CONSISTENCY_WALKS,
    REQUIRED_DAILY_WALKS, REQUIRED_MONTHLY_WALKS, REQUIRED_WEEKLY_DAYS,
};
pub use geofence_event::{
    parse_events, AlarmType, EventParseError, GeofenceEvent, ParsedEvents, RejectedEvent,
    TrackerEventPayload,
};
pub use reward::{MonthlyReward, RewardLine, RewardTable};
pub use user::{PetPlan, User};
pub use walk::{Walk, LONG_WALK_DURATION_SECONDS, MIN_WALK_DURATION_SECONDS};
