use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::WateringLog;
use crate::status;

const LOG_COLUMNS: &str = r#"
    l.id, l.zone_id, z.name AS zone_name, l.started_at, l.duration,
    l.water_used::float8 AS water_used, l.is_manual
"#;

/// Log a manual run and add its water to the owner's running total, atomically.
///
/// Caller must have checked that `zone_id` belongs to `user_id`.
pub async fn record_manual(
    db: &PgPool,
    user_id: Uuid,
    zone_id: Uuid,
    duration: i32,
    water_used: f64,
) -> anyhow::Result<(Uuid, f64)> {
    let mut tx = db.begin().await?;

    let (log_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO watering_logs (zone_id, duration, water_used, is_manual)
        VALUES ($1, $2, $3::numeric, TRUE)
        RETURNING id
        "#,
    )
    .bind(zone_id)
    .bind(duration)
    .bind(water_used)
    .fetch_one(&mut *tx)
    .await?;

    let total = status::repo::add_water_used_tx(&mut tx, user_id, water_used).await?;

    tx.commit().await?;
    Ok((log_id, total))
}

/// The user's logs, newest first. `zone` narrows to one of the user's zones.
pub async fn history(
    db: &PgPool,
    user_id: Uuid,
    zone: Option<Uuid>,
) -> sqlx::Result<Vec<WateringLog>> {
    sqlx::query_as::<_, WateringLog>(&format!(
        r#"
        SELECT {LOG_COLUMNS}
          FROM watering_logs l
          JOIN garden_zones z ON z.id = l.zone_id
         WHERE z.user_id = $1 AND ($2::uuid IS NULL OR l.zone_id = $2)
         ORDER BY l.started_at DESC, l.id DESC
        "#
    ))
    .bind(user_id)
    .bind(zone)
    .fetch_all(db)
    .await
}

pub async fn recent(db: &PgPool, user_id: Uuid, limit: i64) -> sqlx::Result<Vec<WateringLog>> {
    sqlx::query_as::<_, WateringLog>(&format!(
        r#"
        SELECT {LOG_COLUMNS}
          FROM watering_logs l
          JOIN garden_zones z ON z.id = l.zone_id
         WHERE z.user_id = $1
         ORDER BY l.started_at DESC, l.id DESC
         LIMIT $2
        "#
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Waterings started on the database's current date.
pub async fn count_today(db: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
          FROM watering_logs l
          JOIN garden_zones z ON z.id = l.zone_id
         WHERE z.user_id = $1 AND l.started_at::date = CURRENT_DATE
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(n)
}

/// `(count, litres)` over every log of the user.
pub async fn totals(db: &PgPool, user_id: Uuid) -> sqlx::Result<(i64, f64)> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(l.water_used), 0)::float8
          FROM watering_logs l
          JOIN garden_zones z ON z.id = l.zone_id
         WHERE z.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn last_for_zone(db: &PgPool, zone_id: Uuid) -> sqlx::Result<Option<OffsetDateTime>> {
    let (last,): (Option<OffsetDateTime>,) =
        sqlx::query_as("SELECT MAX(started_at) FROM watering_logs WHERE zone_id = $1")
            .bind(zone_id)
            .fetch_one(db)
            .await?;
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DEFAULT_WATER_RATE_LPM,
        watering::services::water_used,
        zones::repo::test_support::{user, zone},
    };

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn manual_watering_updates_running_total(db: PgPool) {
        let alice = user(&db, "alice").await;
        let z = zone(&db, alice, "Tomatoes", 15).await;
        let before = status::repo::get_or_create(&db, alice).await.unwrap();

        let litres = water_used(10, DEFAULT_WATER_RATE_LPM);
        let (_, total) = record_manual(&db, alice, z.id, 10, litres).await.unwrap();
        assert_eq!(litres, 50.0);
        assert_eq!(total, before.total_water_used + 50.0);

        let logs = history(&db, alice, None).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].is_manual);
        assert_eq!(logs[0].zone_name, "Tomatoes");
        assert_eq!(logs[0].water_used, Some(50.0));
        assert_eq!(count_today(&db, alice).await.unwrap(), 1);
        assert_eq!(totals(&db, alice).await.unwrap(), (1, 50.0));
        assert!(last_for_zone(&db, z.id).await.unwrap().is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn history_is_scoped_to_owner_and_zone(db: PgPool) {
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let beds = zone(&db, alice, "Beds", 10).await;
        let lawn = zone(&db, alice, "Lawn", 10).await;
        let roses = zone(&db, bob, "Roses", 10).await;
        record_manual(&db, alice, beds.id, 5, 25.0).await.unwrap();
        record_manual(&db, alice, lawn.id, 5, 25.0).await.unwrap();
        record_manual(&db, bob, roses.id, 5, 25.0).await.unwrap();

        assert_eq!(history(&db, alice, None).await.unwrap().len(), 2);
        assert_eq!(history(&db, alice, Some(lawn.id)).await.unwrap().len(), 1);
        assert!(history(&db, alice, Some(roses.id)).await.unwrap().is_empty());
        assert_eq!(recent(&db, alice, 1).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn log_without_water_amount_still_lists(db: PgPool) {
        let alice = user(&db, "alice").await;
        let beds = zone(&db, alice, "Beds", 10).await;
        sqlx::query(
            "INSERT INTO watering_logs (zone_id, duration, is_manual) VALUES ($1, 7, FALSE)",
        )
        .bind(beds.id)
        .execute(&db)
        .await
        .unwrap();
        record_manual(&db, alice, beds.id, 2, 10.0).await.unwrap();

        let logs = history(&db, alice, None).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().any(|l| l.water_used.is_none()));
        assert_eq!(totals(&db, alice).await.unwrap(), (2, 10.0));
    }
}
