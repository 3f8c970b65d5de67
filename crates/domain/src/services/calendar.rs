//! Calendar helpers for challenge windows and streaks.

use chrono::{Datelike, Days, NaiveDate};

use crate::models::YearMonth;

/// A Monday-to-Sunday week evaluated for the weekly challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    /// 1-based position of the week within its month.
    pub number: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(7)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Every Monday-to-Sunday week whose Sunday falls in `period`.
///
/// A week straddling two months belongs only to the month holding its Sunday,
/// so its Monday may lie in the previous month.
pub fn weeks_for_month(period: YearMonth) -> Vec<WeekWindow> {
    let first = period.first_day();
    let to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    let mut weeks = Vec::new();
    let Some(mut sunday) = first.checked_add_days(Days::new(u64::from(to_sunday))) else {
        return weeks;
    };

    while period.contains(sunday) {
        let Some(start) = sunday.checked_sub_days(Days::new(6)) else {
            break;
        };
        weeks.push(WeekWindow {
            number: weeks.len() as u32 + 1,
            start,
            end: sunday,
        });
        match sunday.checked_add_days(Days::new(7)) {
            Some(next) => sunday = next,
            None => break,
        }
    }
    weeks
}

/// Longest run of walk dates with no calendar day missing between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakSummary {
    /// Walks in the streak; several walks on one day all count.
    pub walks: u32,
    /// Calendar days the streak spans.
    pub days: u32,
    pub last_date: Option<NaiveDate>,
    /// Widest day-span of any streak in the scan, which may not be this one.
    pub longest_days: u32,
}

/// Scan chronologically sorted walk dates for the longest streak by walk count.
///
/// Consecutive dates may be equal or one day apart; any larger gap starts a new
/// streak. On ties the most recent streak wins. `longest_days` is tracked
/// separately across every streak.
pub fn longest_streak<I>(sorted_dates: I) -> StreakSummary
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut best = StreakSummary::default();
    let mut current = StreakSummary::default();
    let mut longest_days = 0;

    for date in sorted_dates {
        match current.last_date {
            Some(last) => match (date - last).num_days() {
                0 => current.walks += 1,
                1 => {
                    current.walks += 1;
                    current.days += 1;
                }
                _ => {
                    current = StreakSummary {
                        walks: 1,
                        days: 1,
                        ..StreakSummary::default()
                    }
                }
            },
            None => {
                current.walks = 1;
                current.days = 1;
            }
        }
        current.last_date = Some(date);
        longest_days = longest_days.max(current.days);

        if current.walks >= best.walks {
            best = current;
        }
    }

    StreakSummary {
        longest_days,
        ..best
    }
}
