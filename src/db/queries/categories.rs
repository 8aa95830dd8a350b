use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing shape for the public browser and the admin table: each category
/// carries the number of questions it currently owns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_category(pool: &SqlitePool, name: &str) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, created_at, updated_at FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_category_by_name(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, created_at, updated_at FROM categories WHERE categories.name = ?1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, created_at, updated_at FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_categories(pool: &SqlitePool) -> sqlx::Result<Vec<CategoryWithCount>> {
    sqlx::query_as::<_, CategoryWithCount>(
        r#"
        SELECT
            categories.id,
            categories.name,
            COUNT(questions.id) AS question_count,
            categories.created_at,
            categories.updated_at
        FROM categories
        LEFT JOIN questions ON questions.category = categories.id
        GROUP BY categories.id
        ORDER BY categories.id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn update_category(pool: &SqlitePool, id: i64, name: &str) -> sqlx::Result<()> {
    get_category(pool, id).await?;
    sqlx::query(
        r#"
        UPDATE categories SET name = ?1, updated_at = ?2 WHERE categories.id = ?3
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    get_category(pool, id).await?;
    sqlx::query(
        r#"
        DELETE FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count_questions(pool: &SqlitePool, category_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM questions WHERE questions.category = ?1
        "#,
    )
    .bind(category_id)
    .fetch_one(pool)
    .await
}

/// Replaces the stored categories with the provided set: rows with a known id
/// are updated, new rows are inserted with their id, and rows absent from the
/// input are deleted. Deletion of a category that still owns questions fails
/// on the foreign key, so question data cannot be orphaned by an import.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    use std::collections::HashSet;

    let existing: HashSet<i64> = get_all_categories(pool).await?.iter().map(|c| c.id).collect();
    let incoming: HashSet<i64> = categories.iter().map(|c| c.id).collect();

    for id in existing.difference(&incoming) {
        delete_category(pool, *id).await?;
    }
    for category in categories {
        if existing.contains(&category.id) {
            update_category(pool, category.id, &category.name).await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}
