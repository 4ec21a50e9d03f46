use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Reporting window ending today.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Period {
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "14d")]
    Days14,
    #[default]
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "mtd")]
    MonthToDate,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "all")]
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Days7 => "7d",
            Period::Days14 => "14d",
            Period::Days30 => "30d",
            Period::Days90 => "90d",
            Period::MonthToDate => "mtd",
            Period::YearToDate => "ytd",
            Period::All => "all",
        }
    }

    /// First date inside the window; `None` for [`Period::All`].
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Days7 => Some(today - Duration::days(7)),
            Period::Days14 => Some(today - Duration::days(14)),
            Period::Days30 => Some(today - Duration::days(30)),
            Period::Days90 => Some(today - Duration::days(90)),
            Period::MonthToDate => today.with_day(1),
            Period::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            Period::All => None,
        }
    }

    /// Undated trades only show up in [`Period::All`].
    pub fn contains(&self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self.cutoff(today), date) {
            (None, _) => true,
            (Some(cutoff), Some(d)) => d >= cutoff,
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownPeriod(pub String);

impl fmt::Display for UnknownPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid period '{}'. expected one of: 7d | 14d | 30d | 90d | mtd | ytd | all",
            self.0
        )
    }
}

impl std::error::Error for UnknownPeriod {}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" => Ok(Period::Days7),
            "14d" => Ok(Period::Days14),
            "30d" => Ok(Period::Days30),
            "90d" => Ok(Period::Days90),
            "mtd" => Ok(Period::MonthToDate),
            "ytd" => Ok(Period::YearToDate),
            "all" => Ok(Period::All),
            other => Err(UnknownPeriod(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownGrouping(pub String);

impl fmt::Display for UnknownGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid grouping '{}'. expected one of: product | trader | region | customer | mill | month",
            self.0
        )
    }
}

impl std::error::Error for UnknownGrouping {}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_round_trips() {
        for p in [
            Period::Days7,
            Period::Days14,
            Period::Days30,
            Period::Days90,
            Period::MonthToDate,
            Period::YearToDate,
            Period::All,
        ] {
            assert_eq!(p.as_str().parse::<Period>(), Ok(p));
        }
        assert!("15d".parse::<Period>().is_err());
    }

    #[test]
    fn cutoffs() {
        let today = d(2026, 3, 15);
        assert_eq!(Period::Days7.cutoff(today), Some(d(2026, 3, 8)));
        assert_eq!(Period::MonthToDate.cutoff(today), Some(d(2026, 3, 1)));
        assert_eq!(Period::YearToDate.cutoff(today), Some(d(2026, 1, 1)));
        assert_eq!(Period::All.cutoff(today), None);
    }

    #[test]
    fn undated_only_in_all() {
        let today = d(2026, 3, 15);
        assert!(Period::All.contains(None, today));
        assert!(!Period::Days90.contains(None, today));
        assert!(Period::Days7.contains(Some(d(2026, 3, 8)), today));
        assert!(!Period::Days7.contains(Some(d(2026, 3, 7)), today));
    }
}
