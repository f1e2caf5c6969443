use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::SystemStatus;

const STATUS_COLUMNS: &str = r#"
    user_id, is_online, last_connection, water_pressure::float8 AS water_pressure,
    total_water_used::float8 AS total_water_used
"#;

/// Fetch the user's status, creating the default row on first access.
pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> sqlx::Result<SystemStatus> {
    sqlx::query("INSERT INTO system_status (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(db)
        .await?;
    sqlx::query_as::<_, SystemStatus>(&format!(
        "SELECT {STATUS_COLUMNS} FROM system_status WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_one(db)
    .await
}

/// Add `litres` to the running total in one statement, so concurrent waterings never lose an update.
pub async fn add_water_used_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    litres: f64,
) -> sqlx::Result<f64> {
    let (total,): (f64,) = sqlx::query_as(
        r#"
        INSERT INTO system_status (user_id, total_water_used)
        VALUES ($1, $2::numeric)
        ON CONFLICT (user_id) DO UPDATE
            SET total_water_used = system_status.total_water_used + EXCLUDED.total_water_used
        RETURNING total_water_used::float8
        "#,
    )
    .bind(user_id)
    .bind(litres)
    .fetch_one(&mut **tx)
    .await?;
    Ok(total)
}
