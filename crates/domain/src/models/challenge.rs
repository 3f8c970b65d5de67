//! Challenge domain models.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Thresholds
// ============================================================================

/// Walks needed on a single day for it to count toward the weekly challenge.
pub const REQUIRED_DAILY_WALKS: usize = 3;

/// Days in a week; all of them must qualify for the weekly challenge.
pub const REQUIRED_WEEKLY_DAYS: u32 = 7;

/// Walks needed in an unbroken streak for the consistency challenge.
pub const REQUIRED_CONSISTENCY_WALKS: u32 = 60;

/// Walks needed within the month for the monthly challenge.
pub const REQUIRED_MONTHLY_WALKS: u32 = 90;

/// Long walks needed in an unbroken streak for the long walks challenge.
pub const REQUIRED_CONSECUTIVE_LONG_WALKS: u32 = 3;

const CHALLENGE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x2d9b_71e0_4c6a_4f83_a5d2_93c1_7b04_e6f8);

// ============================================================================
// Enums
// ============================================================================

/// The four monthly challenge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    WeeklyThreeWalks,
    #[serde(rename = "consistency_60")]
    Consistency60,
    #[serde(rename = "monthly_90")]
    Monthly90,
    LongWalks,
}

impl ChallengeType {
    pub const ALL: [ChallengeType; 4] = [
        Self::WeeklyThreeWalks,
        Self::Consistency60,
        Self::Monthly90,
        Self::LongWalks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::WeeklyThreeWalks => "weekly_three_walks",
            ChallengeType::Consistency60 => "consistency_60",
            ChallengeType::Monthly90 => "monthly_90",
            ChallengeType::LongWalks => "long_walks",
        }
    }

    /// Threshold `progress` has to reach for completion.
    pub fn target(&self) -> u32 {
        match self {
            ChallengeType::WeeklyThreeWalks => REQUIRED_WEEKLY_DAYS,
            ChallengeType::Consistency60 => REQUIRED_CONSISTENCY_WALKS,
            ChallengeType::Monthly90 => REQUIRED_MONTHLY_WALKS,
            ChallengeType::LongWalks => REQUIRED_CONSECUTIVE_LONG_WALKS,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChallengeType::WeeklyThreeWalks => "Three walks every day of the week",
            ChallengeType::Consistency60 => "Keep it consistent",
            ChallengeType::Monthly90 => "Walk the whole month",
            ChallengeType::LongWalks => "Long and frequent walks",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChallengeType::WeeklyThreeWalks => {
                "At least three walks per day from Monday to Sunday"
            }
            ChallengeType::Consistency60 => "60 walks without a single day without walks",
            ChallengeType::Monthly90 => {
                "A total of 90 walks from the first to the last day of the month"
            }
            ChallengeType::LongWalks => {
                "A series of three consecutive walks lasting at least 15 minutes"
            }
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChallengeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly_three_walks" => Ok(ChallengeType::WeeklyThreeWalks),
            "consistency_60" => Ok(ChallengeType::Consistency60),
            "monthly_90" => Ok(ChallengeType::Monthly90),
            "long_walks" => Ok(ChallengeType::LongWalks),
            _ => Err(format!("Invalid challenge type: {}", s)),
        }
    }
}

/// Lifecycle status of a challenge record.
///
/// `Failed` exists for stored records closed out by the caller; the evaluator
/// itself never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl ChallengeStatus {
    /// Status for a progress value against its target.
    pub fn from_progress(progress: u32, target: u32) -> Self {
        if progress >= target {
            ChallengeStatus::Completed
        } else if progress > 0 {
            ChallengeStatus::InProgress
        } else {
            ChallengeStatus::NotStarted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::NotStarted => "not_started",
            ChallengeStatus::InProgress => "in_progress",
            ChallengeStatus::Completed => "completed",
            ChallengeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Year/month
// ============================================================================

/// Error for invalid evaluation targets.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChallengeError {
    #[error("Invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid year: {0}")]
    InvalidYear(i32),
}

/// A calendar month targeted by an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Years accepted by [`YearMonth::new`]; keeps week and month arithmetic in range.
    pub const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

    pub fn new(year: i32, month: u32) -> Result<Self, ChallengeError> {
        shared::validation::validate_month(month)
            .map_err(|_| ChallengeError::InvalidMonth(month))?;
        if !Self::YEARS.contains(&year) {
            return Err(ChallengeError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given date.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated at construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// Type-specific auxiliary data attached to a challenge record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeMetadata {
    #[serde(rename_all = "camelCase")]
    Weekly {
        week_number: u32,
        week_start_date: NaiveDate,
        week_end_date: NaiveDate,
        daily_walks: BTreeMap<NaiveDate, u32>,
    },
    #[serde(rename_all = "camelCase")]
    Consistency {
        consecutive_days: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_walk_date: Option<NaiveDate>,
    },
    #[serde(rename_all = "camelCase")]
    LongWalks {
        consecutive_long_walks: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_long_walk_date: Option<NaiveDate>,
    },
}

impl ChallengeMetadata {
    /// Week start for weekly records, used to tell them apart within a month.
    pub fn week_start(&self) -> Option<NaiveDate> {
        match self {
            ChallengeMetadata::Weekly {
                week_start_date, ..
            } => Some(*week_start_date),
            _ => None,
        }
    }
}

/// Identity of a challenge record: the slot it occupies for a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChallengeKey {
    pub user_id: String,
    pub challenge_type: ChallengeType,
    pub period: YearMonth,
    pub week_start: Option<NaiveDate>,
}

impl ChallengeKey {
    /// Deterministic record id for this slot.
    pub fn record_id(&self) -> Uuid {
        let week = self
            .week_start
            .map(|d| d.to_string())
            .unwrap_or_default();
        Uuid::new_v5(
            &CHALLENGE_ID_NAMESPACE,
            format!(
                "{}:{}:{}:{}",
                self.user_id, self.challenge_type, self.period, week
            )
            .as_bytes(),
        )
    }
}

/// Evaluation outcome for one member, one challenge slot, one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRecord {
    pub id: Uuid,
    pub user_id: String,
    pub user_tax_id: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub month: u32,
    pub year: i32,
    pub status: ChallengeStatus,
    pub progress: u32,
    pub target: u32,
    pub reward: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChallengeMetadata>,
}

impl ChallengeRecord {
    pub fn is_completed(&self) -> bool {
        self.status == ChallengeStatus::Completed
    }

    pub fn period(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.month).ok()
    }

    pub fn key(&self) -> Option<ChallengeKey> {
        Some(ChallengeKey {
            user_id: self.user_id.clone(),
            challenge_type: self.challenge_type,
            period: self.period()?,
            week_start: self.metadata.as_ref().and_then(|m| m.week_start()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_type_strings() {
        for t in ChallengeType::ALL {
            assert_eq!(t.as_str().parse::<ChallengeType>().unwrap(), t);
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_challenge_type_targets() {
        assert_eq!(ChallengeType::WeeklyThreeWalks.target(), 7);
        assert_eq!(ChallengeType::Consistency60.target(), 60);
        assert_eq!(ChallengeType::Monthly90.target(), 90);
        assert_eq!(ChallengeType::LongWalks.target(), 3);
    }

    #[test]
    fn test_status_from_progress() {
        assert_eq!(ChallengeStatus::from_progress(0, 7), ChallengeStatus::NotStarted);
        assert_eq!(ChallengeStatus::from_progress(1, 7), ChallengeStatus::InProgress);
        assert_eq!(ChallengeStatus::from_progress(6, 7), ChallengeStatus::InProgress);
        assert_eq!(ChallengeStatus::from_progress(7, 7), ChallengeStatus::Completed);
        assert_eq!(ChallengeStatus::from_progress(95, 90), ChallengeStatus::Completed);
    }

    #[test]
    fn test_year_month_validation() {
        assert!(YearMonth::new(2024, 0).is_err());
        assert_eq!(YearMonth::new(2024, 13), Err(ChallengeError::InvalidMonth(13)));
        assert!(YearMonth::new(2024, 12).is_ok());
        assert_eq!(YearMonth::new(0, 1), Err(ChallengeError::InvalidYear(0)));
        assert_eq!(YearMonth::new(10_000, 1), Err(ChallengeError::InvalidYear(10_000)));
        assert!(YearMonth::new(9999, 12).is_ok());
    }

    #[test]
    fn test_year_month_bounds() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(dec.next(), YearMonth::new(2024, 1).unwrap());
        assert_eq!(YearMonth::new(2024, 1).unwrap().previous(), dec);
        assert_eq!(dec.to_string(), "2023-12");
    }

    #[test]
    fn test_record_ids_distinguish_weeks() {
        let period = YearMonth::new(2024, 4).unwrap();
        let key = |week_start| ChallengeKey {
            user_id: "u1".to_string(),
            challenge_type: ChallengeType::WeeklyThreeWalks,
            period,
            week_start,
        };

        let a = key(NaiveDate::from_ymd_opt(2024, 4, 1));
        let b = key(NaiveDate::from_ymd_opt(2024, 4, 8));
        assert_ne!(a.record_id(), b.record_id());
        assert_eq!(a.record_id(), a.clone().record_id());
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = ChallengeMetadata::Consistency {
            consecutive_days: 4,
            last_walk_date: NaiveDate::from_ymd_opt(2024, 4, 10),
        };

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"kind\":\"consistency\""));
        assert!(json.contains("\"consecutiveDays\":4"));
        assert!(json.contains("\"lastWalkDate\":\"2024-04-10\""));
    }
}
