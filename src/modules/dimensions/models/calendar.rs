use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the pre-computed date dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    /// e.g. "Monday"
    pub day_of_week: String,
    /// 1 = Monday .. 7 = Sunday
    pub day_of_week_number: i32,
    /// e.g. "Mon"
    pub day_of_week_short: String,
    pub month_name_long: String,
    pub month_name_short: String,
    pub month_number: i32,
    pub week_number: i32,
    /// Zero padded week number, e.g. "07"
    pub week_number_string: String,
    pub year: i32,
    /// Year and week composite, e.g. "2024-07"
    pub year_week_number: String,
}

impl CalendarEntry {
    /// Derive all calendar attributes for a date
    pub fn from_date(date: NaiveDate) -> Self {
        let week = date.iso_week().week() as i32;
        Self {
            date,
            day_of_week: date.format("%A").to_string(),
            day_of_week_number: date.weekday().number_from_monday() as i32,
            day_of_week_short: date.format("%a").to_string(),
            month_name_long: date.format("%B").to_string(),
            month_name_short: date.format("%b").to_string(),
            month_number: date.month() as i32,
            week_number: week,
            week_number_string: format!("{:02}", week),
            year: date.year(),
            year_week_number: format!("{}-{:02}", date.year(), week),
        }
    }
}

/// Option offered to callers when picking the date to compare today against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonDate {
    pub date: NaiveDate,
    pub description: String,
    pub order_value: i32,
}

impl ComparisonDate {
    /// Fixed options (yesterday, last week, last month) followed by the
    /// calendar-derived dates in the order given.
    pub fn with_fixed_options(today: NaiveDate, calendar: &[CalendarEntry]) -> Vec<Self> {
        let fixed = [
            (today.pred_opt(), "Yesterday"),
            (today.checked_sub_days(chrono::Days::new(7)), "Last Week"),
            (today.checked_sub_months(Months::new(1)), "Last Month"),
        ];

        fixed
            .into_iter()
            .filter_map(|(date, description)| {
                date.map(|date| (date, description.to_string()))
            })
            .chain(
                calendar
                    .iter()
                    .map(|entry| (entry.date, entry.date.format("%Y-%m-%d").to_string())),
            )
            .enumerate()
            .map(|(index, (date, description))| Self {
                date,
                description,
                order_value: index as i32,
            })
            .collect()
    }
}
