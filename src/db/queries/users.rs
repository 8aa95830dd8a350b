use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    // The hash stays server-side; user rows serialize without it.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    surname: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO users (name, surname, email, password_hash, role, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(name)
    .bind(surname)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, surname, email, password_hash, role, created_at, updated_at
        FROM users WHERE users.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Lookup is by exact, case-sensitive match on the stored address.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, surname, email, password_hash, role, created_at, updated_at
        FROM users WHERE users.email = ?1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn get_users(pool: &SqlitePool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, surname, email, password_hash, role, created_at, updated_at
        FROM users ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    surname: &str,
    email: &str,
) -> sqlx::Result<()> {
    get_user(pool, id).await?;
    sqlx::query(
        r#"
        UPDATE users SET name = ?1, surname = ?2, email = ?3, updated_at = ?4 WHERE users.id = ?5
        "#,
    )
    .bind(name)
    .bind(surname)
    .bind(email)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_user(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    get_user(pool, id).await?;
    sqlx::query(
        r#"
        DELETE FROM users WHERE users.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
