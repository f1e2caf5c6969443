use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::views::display_datetime;

/// Immutable environmental snapshot; a sensor may omit any value.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SensorReading {
    pub id: Uuid,
    pub zone_id: Uuid,
    #[serde(serialize_with = "display_datetime")]
    pub recorded_at: OffsetDateTime,
    pub soil_moisture: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub soil_moisture: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
}
