//! # Date Ranges
//!
//! Quick-pick ranges used by the report filters and the dashboard.
//! Weeks run Monday to Sunday. `today` is always passed in so the
//! functions stay pure.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The calendar month containing `today`.
    pub fn this_month(today: NaiveDate) -> Self {
        DateRangePreset::ThisMonth.resolve(today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum DateRangePreset {
    Today,
    ThisWeek,
    ThisMonth,
    LastWeek,
    LastMonth,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 + 32 days always lands in the following month.
    first_of_month(first_of_month(date) + Duration::days(32)) - Duration::days(1)
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl DateRangePreset {
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            DateRangePreset::Today => DateRange::new(today, today),
            DateRangePreset::ThisWeek => {
                let monday = monday_of(today);
                DateRange::new(monday, monday + Duration::days(6))
            }
            DateRangePreset::ThisMonth => {
                DateRange::new(first_of_month(today), last_of_month(today))
            }
            DateRangePreset::LastWeek => {
                let monday = monday_of(today) - Duration::days(7);
                DateRange::new(monday, monday + Duration::days(6))
            }
            DateRangePreset::LastMonth => {
                let last = first_of_month(today) - Duration::days(1);
                DateRange::new(first_of_month(last), last)
            }
        }
    }
}
