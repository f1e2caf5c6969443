use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ProfileInput, UserProfile};

/// Profiles normally exist from registration on; older accounts get one lazily.
pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> sqlx::Result<UserProfile> {
    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(db)
        .await?;
    sqlx::query_as::<_, UserProfile>(
        "SELECT user_id, phone, address, created_at FROM user_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    input: &ProfileInput,
) -> sqlx::Result<UserProfile> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles (user_id, phone, address)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET phone = EXCLUDED.phone, address = EXCLUDED.address
        RETURNING user_id, phone, address, created_at
        "#,
    )
    .bind(user_id)
    .bind(&input.phone)
    .bind(&input.address)
    .fetch_one(db)
    .await
}
