//! Virtual-time granularities.
//!
//! Every unit converts to a whole number of virtual seconds.
//! A month is fixed at 30 days and a year at 365 days.

use crate::types::VirtualSeconds;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Year,
    ];

    /// Length of this unit in virtual seconds.
    pub const fn seconds(self) -> VirtualSeconds {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour   => 3_600,
            Self::Day    => 86_400,
            Self::Week   => 604_800,
            Self::Month  => 2_592_000,
            Self::Year   => 31_536_000,
        }
    }

    /// How many of `self` fit into one `other`. Fractional when `self` is larger.
    pub fn ratio_to(self, other: TimeUnit) -> f64 {
        self.seconds() as f64 / other.seconds() as f64
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour   => "hour",
            Self::Day    => "day",
            Self::Week   => "week",
            Self::Month  => "month",
            Self::Year   => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_are_strictly_increasing() {
        for pair in TimeUnit::ALL.windows(2) {
            assert!(pair[0].seconds() < pair[1].seconds(), "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn hour_is_one_twenty_fourth_of_a_day() {
        let r = TimeUnit::Hour.ratio_to(TimeUnit::Day);
        assert!((r - 1.0 / 24.0).abs() < 1e-12);
        assert_eq!(TimeUnit::Day.ratio_to(TimeUnit::Hour), 24.0);
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&TimeUnit::Month).unwrap();
        assert_eq!(json, "\"month\"");
        let back: TimeUnit = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(back, TimeUnit::Week);
    }
}
