use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::views::display_datetime;

/// One watering event joined with the zone it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WateringLog {
    pub id: Uuid,
    pub zone_id: Uuid,
    pub zone_name: String,
    #[serde(serialize_with = "display_datetime")]
    pub started_at: OffsetDateTime,
    pub duration: i32,
    /// Litres; older or imported logs may not carry a value.
    pub water_used: Option<f64>,
    pub is_manual: bool,
}
