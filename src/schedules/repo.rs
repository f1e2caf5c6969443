use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ScheduleInput, WateringSchedule};
use crate::error::{AppError, AppResult};

/// Caller must have checked that `zone_id` belongs to the user.
pub async fn create(
    db: &PgPool,
    zone_id: Uuid,
    input: &ScheduleInput,
) -> sqlx::Result<WateringSchedule> {
    sqlx::query_as::<_, WateringSchedule>(
        r#"
        INSERT INTO watering_schedules (zone_id, time, days_of_week, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING id, zone_id, time, days_of_week, is_active
        "#,
    )
    .bind(zone_id)
    .bind(input.time)
    .bind(input.days.to_string())
    .bind(input.is_active)
    .fetch_one(db)
    .await
}

/// Ownership guard through the parent zone.
pub async fn find_owned(
    db: &PgPool,
    user_id: Uuid,
    schedule_id: Uuid,
) -> AppResult<WateringSchedule> {
    sqlx::query_as::<_, WateringSchedule>(
        r#"
        SELECT s.id, s.zone_id, s.time, s.days_of_week, s.is_active
          FROM watering_schedules s
          JOIN garden_zones z ON z.id = s.zone_id
         WHERE s.id = $1 AND z.user_id = $2
        "#,
    )
    .bind(schedule_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound)
}

/// Schedules of the given zones, ordered by time of day.
pub async fn list_for_zones(
    db: &PgPool,
    zone_ids: &[Uuid],
) -> sqlx::Result<Vec<WateringSchedule>> {
    sqlx::query_as::<_, WateringSchedule>(
        r#"
        SELECT id, zone_id, time, days_of_week, is_active
          FROM watering_schedules
         WHERE zone_id = ANY($1)
         ORDER BY time, id
        "#,
    )
    .bind(zone_ids)
    .fetch_all(db)
    .await
}

pub async fn delete_owned(db: &PgPool, user_id: Uuid, schedule_id: Uuid) -> AppResult<()> {
    let res = sqlx::query(
        r#"
        DELETE FROM watering_schedules s
         USING garden_zones z
         WHERE s.id = $1 AND s.zone_id = z.id AND z.user_id = $2
        "#,
    )
    .bind(schedule_id)
    .bind(user_id)
    .execute(db)
    .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Flip `is_active` in place and return the new value.
pub async fn toggle(db: &PgPool, user_id: Uuid, schedule_id: Uuid) -> AppResult<bool> {
    let row: Option<(bool,)> = sqlx::query_as(
        r#"
        UPDATE watering_schedules s
           SET is_active = NOT s.is_active
          FROM garden_zones z
         WHERE s.id = $1 AND s.zone_id = z.id AND z.user_id = $2
        RETURNING s.is_active
        "#,
    )
    .bind(schedule_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    row.map(|(active,)| active).ok_or(AppError::NotFound)
}

pub async fn count_active_for_zone(db: &PgPool, zone_id: Uuid) -> sqlx::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM watering_schedules WHERE zone_id = $1 AND is_active",
    )
    .bind(zone_id)
    .fetch_one(db)
    .await?;
    Ok(n)
}

pub async fn count_active_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
          FROM watering_schedules s
          JOIN garden_zones z ON z.id = s.zone_id
         WHERE z.user_id = $1 AND s.is_active
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(n)
}
