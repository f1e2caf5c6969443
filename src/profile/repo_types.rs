use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::views::display_date;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub phone: String,
    pub address: String,
    #[serde(serialize_with = "display_date")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInput {
    pub phone: String,
    pub address: String,
}
