use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{GardenZone, ZoneInput};
use crate::error::{AppError, AppResult};

const ZONE_COLUMNS: &str = r#"
    id, user_id, name, description, plant_type, area_size::float8 AS area_size,
    watering_duration, watering_frequency, created_at
"#;

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<GardenZone>> {
    sqlx::query_as::<_, GardenZone>(&format!(
        "SELECT {ZONE_COLUMNS} FROM garden_zones WHERE user_id = $1 ORDER BY name, created_at"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn count_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM garden_zones WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(n)
}

/// Ownership guard: a zone that is missing or belongs to someone else is `NotFound`.
pub async fn find_owned(db: &PgPool, user_id: Uuid, zone_id: Uuid) -> AppResult<GardenZone> {
    sqlx::query_as::<_, GardenZone>(&format!(
        "SELECT {ZONE_COLUMNS} FROM garden_zones WHERE id = $1 AND user_id = $2"
    ))
    .bind(zone_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn create(db: &PgPool, user_id: Uuid, input: &ZoneInput) -> sqlx::Result<GardenZone> {
    sqlx::query_as::<_, GardenZone>(&format!(
        r#"
        INSERT INTO garden_zones
            (user_id, name, description, plant_type, area_size, watering_duration, watering_frequency)
        VALUES ($1, $2, $3, $4, $5::numeric, $6, $7)
        RETURNING {ZONE_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.plant_type)
    .bind(input.area_size)
    .bind(input.watering_duration)
    .bind(input.watering_frequency)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    zone_id: Uuid,
    input: &ZoneInput,
) -> AppResult<GardenZone> {
    sqlx::query_as::<_, GardenZone>(&format!(
        r#"
        UPDATE garden_zones
           SET name = $3, description = $4, plant_type = $5, area_size = $6::numeric,
               watering_duration = $7, watering_frequency = $8
         WHERE id = $1 AND user_id = $2
        RETURNING {ZONE_COLUMNS}
        "#
    ))
    .bind(zone_id)
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.plant_type)
    .bind(input.area_size)
    .bind(input.watering_duration)
    .bind(input.watering_frequency)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound)
}

/// Delete an owned zone; schedules, logs and readings go with it (`ON DELETE CASCADE`).
pub async fn delete(db: &PgPool, user_id: Uuid, zone_id: Uuid) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM garden_zones WHERE id = $1 AND user_id = $2")
        .bind(zone_id)
        .bind(user_id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::{user, zone};
    use super::*;

    async fn count(db: &PgPool, table: &str, zone_id: Uuid) -> i64 {
        let (n,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {table} WHERE zone_id = $1"
        ))
        .bind(zone_id)
        .fetch_one(db)
        .await
        .unwrap();
        n
    }

    async fn seed_children(db: &PgPool, zone_id: Uuid) {
        sqlx::query("INSERT INTO watering_schedules (zone_id, time) VALUES ($1, '06:00')")
            .bind(zone_id)
            .execute(db)
            .await
            .unwrap();
        sqlx::query("INSERT INTO watering_logs (zone_id, duration, water_used) VALUES ($1, 5, 25)")
            .bind(zone_id)
            .execute(db)
            .await
            .unwrap();
        sqlx::query("INSERT INTO sensor_readings (zone_id, soil_moisture) VALUES ($1, 40)")
            .bind(zone_id)
            .execute(db)
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn delete_cascades_only_within_the_zone(db: PgPool) {
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let doomed = zone(&db, alice, "Tomatoes", 15).await;
        let kept = zone(&db, bob, "Roses", 10).await;
        seed_children(&db, doomed.id).await;
        seed_children(&db, kept.id).await;

        delete(&db, alice, doomed.id).await.unwrap();

        for table in ["watering_schedules", "watering_logs", "sensor_readings"] {
            assert_eq!(count(&db, table, doomed.id).await, 0, "{table}");
            assert_eq!(count(&db, table, kept.id).await, 1, "{table}");
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn foreign_zone_is_not_found(db: PgPool) {
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let z = zone(&db, alice, "Tomatoes", 15).await;

        assert!(matches!(find_owned(&db, bob, z.id).await, Err(AppError::NotFound)));
        assert!(matches!(delete(&db, bob, z.id).await, Err(AppError::NotFound)));
        assert!(find_owned(&db, alice, z.id).await.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn update_rewrites_fields(db: PgPool) {
        let alice = user(&db, "alice").await;
        let z = zone(&db, alice, "Tomatoes", 15).await;
        let input = ZoneInput {
            name: "Cherry tomatoes".into(),
            description: "south bed".into(),
            plant_type: "tomato".into(),
            area_size: None,
            watering_duration: 30,
            watering_frequency: 2,
        };
        let updated = update(&db, alice, z.id, &input).await.unwrap();
        assert_eq!(updated.name, "Cherry tomatoes");
        assert_eq!(updated.area_size, None);
        assert_eq!(updated.watering_duration, 30);
        assert_eq!(count_by_user(&db, alice).await.unwrap(), 1);
    }
}
