use std::cmp::Ordering;
use std::fmt;

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

/// A (year, month) pair selecting one dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.number_from_month(), 1)
    }

    /// Last calendar day of the month, leap years included.
    pub fn last_day(&self) -> Option<NaiveDate> {
        let (next_year, next_month) = match self.month {
            Month::December => (self.year.checked_add(1)?, 1),
            m => (self.year, m.number_from_month() + 1),
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year.cmp(&other.year).then(
            self.month
                .number_from_month()
                .cmp(&other.month.number_from_month()),
        )
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

/// Parse a month given as a name ("January", "jan") or a number ("1".."12").
pub fn parse_month(input: &str) -> Result<Month, ParseMonthError> {
    let input = input.trim();
    if let Ok(number) = input.parse::<u8>() {
        return Month::try_from(number).map_err(|_| ParseMonthError(input.to_string()));
    }
    input
        .parse::<Month>()
        .map_err(|_| ParseMonthError(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError(pub String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month '{}'", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_day_handles_month_lengths() {
        assert_eq!(Period::new(2024, Month::January).last_day(), Some(date(2024, 1, 31)));
        assert_eq!(Period::new(2024, Month::February).last_day(), Some(date(2024, 2, 29)));
        assert_eq!(Period::new(2023, Month::February).last_day(), Some(date(2023, 2, 28)));
        assert_eq!(Period::new(2024, Month::April).last_day(), Some(date(2024, 4, 30)));
        assert_eq!(Period::new(2024, Month::December).last_day(), Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_contains() {
        let period = Period::new(2024, Month::March);
        assert!(period.contains(date(2024, 3, 1)));
        assert!(period.contains(date(2024, 3, 31)));
        assert!(!period.contains(date(2024, 4, 1)));
        assert!(!period.contains(date(2023, 3, 15)));
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut periods = vec![
            Period::new(2024, Month::February),
            Period::new(2023, Month::December),
            Period::new(2024, Month::January),
        ];
        periods.sort();
        assert_eq!(
            periods,
            vec![
                Period::new(2023, Month::December),
                Period::new(2024, Month::January),
                Period::new(2024, Month::February),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::new(2024, Month::January).to_string(), "January 2024");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("January"), Ok(Month::January));
        assert_eq!(parse_month("feb"), Ok(Month::February));
        assert_eq!(parse_month("12"), Ok(Month::December));
        assert!(parse_month("13").is_err());
        assert!(parse_month("Smarch").is_err());
    }
}
