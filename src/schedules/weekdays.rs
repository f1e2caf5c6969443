//! Weekday sets as stored in `watering_schedules.days_of_week`: `"1,3,5"`, Monday = 1.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeekdayError {
    #[error("no weekday selected")]
    Empty,
    #[error("{0:?} is not a day between 1 and 7")]
    OutOfRange(String),
}

/// Non-empty, deduplicated set of ISO weekday numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    pub fn every_day() -> Self {
        Self((1..=7).collect())
    }

    pub fn from_days<I, S>(days: I) -> Result<Self, WeekdayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for day in days {
            let raw = day.as_ref().trim();
            match raw.parse::<u8>() {
                Ok(d @ 1..=7) => {
                    set.insert(d);
                }
                _ => return Err(WeekdayError::OutOfRange(raw.to_string())),
            }
        }
        if set.is_empty() {
            return Err(WeekdayError::Empty);
        }
        Ok(Self(set))
    }

    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Short names for display, e.g. `["Mon", "Wed"]`.
    pub fn labels(&self) -> Vec<&'static str> {
        self.days().map(|d| NAMES[usize::from(d - 1)]).collect()
    }
}

impl FromStr for WeekdaySet {
    type Err = WeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_days(s.split(',').filter(|p| !p.trim().is_empty()))
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for d in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{d}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.0.iter())
    }
}

/// `(value, label)` pairs for the weekday checkboxes.
pub fn choices() -> Vec<(u8, &'static str)> {
    (1u8..=7).zip(NAMES).collect()
}
