use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ZoneStatusResponse {
    pub zone_id: Uuid,
    pub zone_name: String,
    pub soil_moisture: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_watering: Option<OffsetDateTime>,
    /// Active schedules only.
    pub schedules_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub schedule_id: Uuid,
    pub is_active: bool,
    pub message: &'static str,
}

impl ToggleResponse {
    pub fn new(schedule_id: Uuid, is_active: bool) -> Self {
        let message = if is_active {
            "Schedule enabled"
        } else {
            "Schedule disabled"
        };
        Self {
            schedule_id,
            is_active,
            message,
        }
    }
}
