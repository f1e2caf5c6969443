use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::views::display_date;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GardenZone {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub plant_type: String,
    pub area_size: Option<f64>,
    pub watering_duration: i32,
    pub watering_frequency: i32,
    #[serde(serialize_with = "display_date")]
    pub created_at: OffsetDateTime,
}

/// Validated zone fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneInput {
    pub name: String,
    pub description: String,
    pub plant_type: String,
    pub area_size: Option<f64>,
    pub watering_duration: i32,
    pub watering_frequency: i32,
}
