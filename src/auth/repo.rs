use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserSession};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, created_at";

impl User {
    /// Find a user by username (case-sensitive, like the login form).
    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn username_taken(db: &PgPool, username: &str) -> sqlx::Result<bool> {
        let (taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(db)
                .await?;
        Ok(taken)
    }
}

async fn insert_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewUser<'_>,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(new.username)
    .bind(new.email)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.password_hash)
    .fetch_one(&mut **tx)
    .await
}

/// Create the user together with its profile and system status in one transaction.
pub async fn register_user(db: &PgPool, new: &NewUser<'_>) -> sqlx::Result<User> {
    let mut tx = db.begin().await?;
    let user = insert_user_tx(&mut tx, new).await?;
    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO system_status (user_id) VALUES ($1)")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

/// `true` when the error is a unique-constraint violation (e.g. a username race).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

// ---- sessions ----

pub async fn create_session(
    db: &PgPool,
    user_id: Uuid,
    expires_at: OffsetDateTime,
) -> anyhow::Result<UserSession> {
    sqlx::query_as::<_, UserSession>(
        r#"
        INSERT INTO user_sessions (user_id, expires_at)
        VALUES ($1, $2)
        RETURNING id, expires_at
        "#,
    )
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(db)
    .await
    .context("insert session")
}

/// Resolve a live session to its user; `None` when revoked, expired or mismatched.
pub async fn find_session_user(
    db: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<(Uuid, String)>> {
    sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT u.id, u.username
          FROM user_sessions s
          JOIN users u ON u.id = s.user_id
         WHERE s.id = $1 AND s.user_id = $2 AND s.expires_at > now()
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn delete_session(db: &PgPool, session_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM user_sessions WHERE id = $1")
        .bind(session_id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice<'a>(hash: &'a str) -> NewUser<'a> {
        NewUser {
            username: "alice",
            email: "alice@example.com",
            first_name: "Alice",
            last_name: "",
            password_hash: hash,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn registration_creates_profile_and_status(db: PgPool) {
        let user = register_user(&db, &alice("hash")).await.unwrap();

        let (profiles,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_profiles WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(&db)
                .await
                .unwrap();
        let (total,): (f64,) = sqlx::query_as(
            "SELECT total_water_used::float8 FROM system_status WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_one(&db)
        .await
        .unwrap();
        assert_eq!(profiles, 1);
        assert_eq!(total, 0.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn duplicate_username_rolls_back(db: PgPool) {
        register_user(&db, &alice("hash")).await.unwrap();
        let err = register_user(&db, &alice("other")).await.unwrap_err();
        assert!(is_unique_violation(&err));

        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&db)
            .await
            .unwrap();
        let (statuses,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM system_status")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!((users, statuses), (1, 1));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn deleted_session_no_longer_resolves(db: PgPool) {
        let user = register_user(&db, &alice("hash")).await.unwrap();
        let exp = OffsetDateTime::now_utc() + time::Duration::hours(1);
        let session = create_session(&db, user.id, exp).await.unwrap();
        assert!(session.expires_at > OffsetDateTime::now_utc());

        let found = find_session_user(&db, session.id, user.id).await.unwrap();
        assert_eq!(found, Some((user.id, "alice".to_string())));

        delete_session(&db, session.id).await.unwrap();
        assert!(find_session_user(&db, session.id, user.id)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn expired_session_is_rejected(db: PgPool) {
        let user = register_user(&db, &alice("hash")).await.unwrap();
        let past = OffsetDateTime::now_utc() - time::Duration::minutes(1);
        let session = create_session(&db, user.id, past).await.unwrap();
        assert!(find_session_user(&db, session.id, user.id)
            .await
            .unwrap()
            .is_none());
    }
}
