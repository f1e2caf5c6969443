use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::views::display_datetime_opt;

/// Per-user operational summary; `total_water_used` is in litres.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SystemStatus {
    pub user_id: Uuid,
    pub is_online: bool,
    #[serde(serialize_with = "display_datetime_opt")]
    pub last_connection: Option<OffsetDateTime>,
    pub water_pressure: Option<f64>,
    pub total_water_used: f64,
}
