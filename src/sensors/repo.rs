use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewReading, SensorReading};

const READING_COLUMNS: &str = r#"
    id, zone_id, recorded_at, soil_moisture, temperature::float8 AS temperature, humidity
"#;

/// Caller must have checked that `zone_id` belongs to the user.
pub async fn insert(db: &PgPool, zone_id: Uuid, r: &NewReading) -> sqlx::Result<SensorReading> {
    sqlx::query_as::<_, SensorReading>(&format!(
        r#"
        INSERT INTO sensor_readings (zone_id, soil_moisture, temperature, humidity)
        VALUES ($1, $2, $3::numeric, $4)
        RETURNING {READING_COLUMNS}
        "#
    ))
    .bind(zone_id)
    .bind(r.soil_moisture)
    .bind(r.temperature)
    .bind(r.humidity)
    .fetch_one(db)
    .await
}

pub async fn latest_for_zone(db: &PgPool, zone_id: Uuid) -> sqlx::Result<Option<SensorReading>> {
    sqlx::query_as::<_, SensorReading>(&format!(
        r#"
        SELECT {READING_COLUMNS}
          FROM sensor_readings
         WHERE zone_id = $1
         ORDER BY recorded_at DESC, id DESC
         LIMIT 1
        "#
    ))
    .bind(zone_id)
    .fetch_optional(db)
    .await
}

/// Newest reading of each zone; zones without readings are simply absent.
pub async fn latest_per_zone(db: &PgPool, zone_ids: &[Uuid]) -> sqlx::Result<Vec<SensorReading>> {
    sqlx::query_as::<_, SensorReading>(&format!(
        r#"
        SELECT DISTINCT ON (zone_id) {READING_COLUMNS}
          FROM sensor_readings
         WHERE zone_id = ANY($1)
         ORDER BY zone_id, recorded_at DESC, id DESC
        "#
    ))
    .bind(zone_ids)
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::repo::test_support::{user, zone};

    fn reading(moisture: i32) -> NewReading {
        NewReading {
            soil_moisture: Some(moisture),
            temperature: Some(18.5),
            humidity: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn latest_wins_per_zone(db: PgPool) {
        let alice = user(&db, "alice").await;
        let beds = zone(&db, alice, "Beds", 10).await;
        let lawn = zone(&db, alice, "Lawn", 10).await;
        let empty = zone(&db, alice, "Empty", 10).await;

        insert(&db, beds.id, &reading(30)).await.unwrap();
        sqlx::query(
            "UPDATE sensor_readings SET recorded_at = now() - interval '1 hour' WHERE zone_id = $1",
        )
        .bind(beds.id)
        .execute(&db)
        .await
        .unwrap();
        insert(&db, beds.id, &reading(45)).await.unwrap();
        insert(&db, lawn.id, &reading(60)).await.unwrap();

        let latest = latest_per_zone(&db, &[beds.id, lawn.id, empty.id]).await.unwrap();
        assert_eq!(latest.len(), 2);
        let beds_latest = latest.iter().find(|r| r.zone_id == beds.id).unwrap();
        assert_eq!(beds_latest.soil_moisture, Some(45));
        assert_eq!(beds_latest.temperature, Some(18.5));

        assert!(latest_for_zone(&db, empty.id).await.unwrap().is_none());
    }
}
