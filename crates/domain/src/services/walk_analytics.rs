//! Walk grouping and statistics for reporting.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Walk, YearMonth};

/// Attributed walks grouped by owning member. Unattributed walks are skipped.
pub fn group_by_user(walks: &[Walk]) -> BTreeMap<String, Vec<&Walk>> {
    let mut grouped: BTreeMap<String, Vec<&Walk>> = BTreeMap::new();
    for walk in walks.iter().filter(|w| w.is_attributed()) {
        grouped.entry(walk.user_id.clone()).or_default().push(walk);
    }
    grouped
}

/// Walks grouped by the month their start falls in.
pub fn group_by_month<'a>(
    walks: &'a [Walk],
    offset: &FixedOffset,
) -> BTreeMap<YearMonth, Vec<&'a Walk>> {
    let mut grouped: BTreeMap<YearMonth, Vec<&Walk>> = BTreeMap::new();
    for walk in walks {
        grouped
            .entry(YearMonth::of(walk.start_date(offset)))
            .or_default()
            .push(walk);
    }
    grouped
}

/// Walks starting within `[from, to]`, both ends inclusive.
pub fn filter_by_range(walks: &[Walk], from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Walk> {
    walks
        .iter()
        .filter(|w| w.start_time >= from && w.start_time <= to)
        .collect()
}

/// Aggregate figures for a set of walks. Durations and distances cover valid walks only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkStatistics {
    pub total_walks: usize,
    pub valid_walks: usize,
    pub invalid_walks: usize,
    pub total_duration_minutes: i64,
    pub average_duration_minutes: f64,
    pub total_distance_meters: f64,
    pub average_distance_meters: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_walk_id: Option<uuid::Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortest_valid_walk_id: Option<uuid::Uuid>,
}

impl WalkStatistics {
    pub fn from_walks<'a, I>(walks: I) -> Self
    where
        I: IntoIterator<Item = &'a Walk>,
    {
        let walks: Vec<&Walk> = walks.into_iter().collect();
        let valid: Vec<&Walk> = walks.iter().copied().filter(|w| w.is_valid).collect();

        let total_duration_minutes: i64 = valid.iter().map(|w| w.duration_minutes()).sum();
        let total_distance_meters: f64 = valid.iter().map(|w| w.distance_meters).sum();
        let average = |total: f64| {
            if valid.is_empty() {
                0.0
            } else {
                total / valid.len() as f64
            }
        };

        // Ties resolve to the first walk seen.
        let longest = valid.iter().copied().fold(None::<&Walk>, |best, w| match best {
            Some(b) if b.duration_seconds >= w.duration_seconds => Some(b),
            _ => Some(w),
        });
        let shortest = valid.iter().copied().fold(None::<&Walk>, |best, w| match best {
            Some(b) if b.duration_seconds <= w.duration_seconds => Some(b),
            _ => Some(w),
        });

        Self {
            total_walks: walks.len(),
            valid_walks: valid.len(),
            invalid_walks: walks.len() - valid.len(),
            total_duration_minutes,
            average_duration_minutes: average(total_duration_minutes as f64),
            total_distance_meters,
            average_distance_meters: average(total_distance_meters),
            longest_walk_id: longest.map(|w| w.id),
            shortest_valid_walk_id: shortest.map(|w| w.id),
        }
    }
}
