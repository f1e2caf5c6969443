use serde::Serialize;
use sqlx::FromRow;
use time::Time;
use uuid::Uuid;

use super::weekdays::WeekdaySet;
use crate::views::display_time;

#[derive(Debug, Clone, FromRow)]
pub struct WateringSchedule {
    pub id: Uuid,
    pub zone_id: Uuid,
    pub time: Time,
    pub days_of_week: String,
    pub is_active: bool,
}

impl WateringSchedule {
    /// Stored days; a corrupt column falls back to an empty list rather than failing the page.
    pub fn days(&self) -> Option<WeekdaySet> {
        self.days_of_week.parse().ok()
    }
}

/// Template-facing schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub id: Uuid,
    pub zone_id: Uuid,
    #[serde(serialize_with = "display_time")]
    pub time: Time,
    pub days: Vec<&'static str>,
    pub is_active: bool,
}

impl From<&WateringSchedule> for ScheduleView {
    fn from(s: &WateringSchedule) -> Self {
        Self {
            id: s.id,
            zone_id: s.zone_id,
            time: s.time,
            days: s.days().map(|d| d.labels()).unwrap_or_default(),
            is_active: s.is_active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub time: Time,
    pub days: WeekdaySet,
    pub is_active: bool,
}
