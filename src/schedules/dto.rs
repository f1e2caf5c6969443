use serde::{Deserialize, Serialize};
use time::{macros::format_description, Time};

use super::{
    repo_types::ScheduleInput,
    weekdays::{WeekdayError, WeekdaySet},
};
use crate::forms::FormErrors;

/// Body of `POST /zone/{id}/schedule/create/`. `days` repeats once per ticked box.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleForm {
    pub time: String,
    pub days: Vec<String>,
    pub is_active: Option<String>,
}

impl ScheduleForm {
    /// Blank form as first shown: every day ticked, active.
    pub fn initial() -> Self {
        Self {
            time: String::new(),
            days: WeekdaySet::every_day().days().map(|d| d.to_string()).collect(),
            is_active: Some("on".into()),
        }
    }

    pub fn validate(&self) -> Result<ScheduleInput, FormErrors> {
        let mut errors = FormErrors::new();

        let time = match parse_time(&self.time) {
            Some(t) => Some(t),
            None if self.time.trim().is_empty() => {
                errors.add("time", "This field is required.");
                None
            }
            None => {
                errors.add("time", "Enter a valid time.");
                None
            }
        };

        let days = match WeekdaySet::from_days(&self.days) {
            Ok(d) => Some(d),
            Err(WeekdayError::Empty) => {
                errors.add("days", "This field is required.");
                None
            }
            Err(WeekdayError::OutOfRange(v)) => {
                errors.add(
                    "days",
                    format!("Select a valid choice. {v} is not one of the available choices."),
                );
                None
            }
        };

        let is_active = self.is_active.is_some();
        match (time, days) {
            (Some(time), Some(days)) => errors.finish(ScheduleInput {
                time,
                days,
                is_active,
            }),
            _ => Err(errors),
        }
    }
}

/// Accepts `HH:MM` (what `<input type="time">` sends) and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    Time::parse(raw, format_description!("[hour]:[minute]"))
        .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]:[second]")))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    fn form(t: &str, days: &[&str], active: bool) -> ScheduleForm {
        ScheduleForm {
            time: t.into(),
            days: days.iter().map(|d| d.to_string()).collect(),
            is_active: active.then(|| "on".to_string()),
        }
    }

    #[test]
    fn parses_browser_time_values() {
        assert_eq!(parse_time("06:30"), Some(time!(6:30)));
        assert_eq!(parse_time("21:05:10"), Some(time!(21:05:10)));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("morning"), None);
    }

    #[test]
    fn valid_schedule_is_normalized() {
        let input = form("07:00", &["6", "1", "3"], true).validate().unwrap();
        assert_eq!(input.time, time!(7:00));
        assert_eq!(input.days.to_string(), "1,3,6");
        assert!(input.is_active);
    }

    #[test]
    fn unchecked_box_means_inactive() {
        let input = form("07:00", &["1"], false).validate().unwrap();
        assert!(!input.is_active);
    }

    #[test]
    fn days_are_required_and_bounded() {
        assert!(form("07:00", &[], true).validate().unwrap_err().has("days"));
        assert!(form("07:00", &["9"], true).validate().unwrap_err().has("days"));
    }

    #[test]
    fn time_is_required() {
        let errors = form("", &["1"], true).validate().unwrap_err();
        assert_eq!(errors.get("time"), ["This field is required."]);
    }

    #[test]
    fn initial_form_ticks_every_day() {
        let f = ScheduleForm::initial();
        assert_eq!(f.days.len(), 7);
        assert!(f.is_active.is_some());
    }
}
