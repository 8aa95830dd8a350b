use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub category: i64,
    pub question: String,
    pub answer: String,
    pub visit_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for the visit statistics feed: the question joined with its
/// category name, sorted by popularity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionStats {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub visit_count: i64,
    pub category_name: String,
}

pub async fn create_question(
    pool: &SqlitePool,
    category: i64,
    question: &str,
    answer: &str,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO questions (category, question, answer, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(category)
    .bind(question)
    .bind(answer)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, category, question, answer, visit_count, created_at, updated_at
        FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, category, question, answer, visit_count, created_at, updated_at
        FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, category, question, answer, visit_count, created_at, updated_at
        FROM questions WHERE questions.category = ?1 ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

pub async fn update_question(
    pool: &SqlitePool,
    id: i64,
    question: &str,
    answer: &str,
) -> sqlx::Result<()> {
    get_question(pool, id).await?;
    sqlx::query(
        r#"
        UPDATE questions SET question = ?1, answer = ?2, updated_at = ?3 WHERE questions.id = ?4
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    get_question(pool, id).await?;
    sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Counts one answer reveal. The increment happens inside the store so
/// concurrent reveals of the same question never lose updates.
pub async fn increment_visits(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE questions SET visit_count = visit_count + 1 WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

pub async fn get_question_stats(pool: &SqlitePool, id: i64) -> sqlx::Result<QuestionStats> {
    sqlx::query_as::<_, QuestionStats>(
        r#"
        SELECT
            questions.id,
            questions.question,
            questions.answer,
            questions.visit_count,
            categories.name AS category_name
        FROM questions
        JOIN categories ON questions.category = categories.id
        WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Most-visited first; ties resolve by id, i.e. insertion order. A negative
/// or absent limit returns everything.
pub async fn get_questions_by_visits(
    pool: &SqlitePool,
    limit: Option<i64>,
) -> sqlx::Result<Vec<QuestionStats>> {
    sqlx::query_as::<_, QuestionStats>(
        r#"
        SELECT
            questions.id,
            questions.question,
            questions.answer,
            questions.visit_count,
            categories.name AS category_name
        FROM questions
        JOIN categories ON questions.category = categories.id
        ORDER BY questions.visit_count DESC, questions.id ASC
        LIMIT COALESCE(?1, -1)
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Same diff-sync contract as [`super::categories::import_categories`].
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    use std::collections::HashSet;

    let existing: HashSet<i64> = get_questions(pool).await?.iter().map(|q| q.id).collect();
    let incoming: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    for id in existing.difference(&incoming) {
        delete_question(pool, *id).await?;
    }
    for q in questions {
        if existing.contains(&q.id) {
            sqlx::query(
                r#"
                UPDATE questions SET category = ?1, question = ?2, answer = ?3, visit_count = ?4,
                    updated_at = ?5
                WHERE questions.id = ?6
                "#,
            )
            .bind(q.category)
            .bind(&q.question)
            .bind(&q.answer)
            .bind(q.visit_count)
            .bind(Utc::now())
            .bind(q.id)
            .execute(pool)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO questions (id, category, question, answer, visit_count, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(q.id)
            .bind(q.category)
            .bind(&q.question)
            .bind(&q.answer)
            .bind(q.visit_count)
            .bind(q.created_at)
            .bind(q.updated_at)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::categories::create_category;
    use crate::test_utils::test_helpers::{create_test_db, create_test_db_file};

    #[tokio::test]
    async fn question_carries_its_answer() {
        let pool = create_test_db().await.unwrap();
        let category = create_category(&pool, "Scholarship").await.unwrap();
        let id = create_question(&pool, category, "How do I apply?", "Fill the form.")
            .await
            .unwrap();

        let question = get_question(&pool, id).await.unwrap();
        assert_eq!(question.question, "How do I apply?");
        assert_eq!(question.answer, "Fill the form.");
        assert_eq!(question.visit_count, 0);
    }

    #[tokio::test]
    async fn deleting_question_leaves_no_answer_behind() {
        let pool = create_test_db().await.unwrap();
        let category = create_category(&pool, "Visa").await.unwrap();
        let id = create_question(&pool, category, "Need a visa?", "Depends.")
            .await
            .unwrap();

        delete_question(&pool, id).await.unwrap();

        assert!(matches!(
            get_question(&pool, id).await.unwrap_err(),
            sqlx::Error::RowNotFound
        ));
        assert!(get_questions(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_both_texts() {
        let pool = create_test_db().await.unwrap();
        let category = create_category(&pool, "Fees").await.unwrap();
        let id = create_question(&pool, category, "Old?", "Old.").await.unwrap();

        update_question(&pool, id, "New?", "New.").await.unwrap();

        let question = get_question(&pool, id).await.unwrap();
        assert_eq!(question.question, "New?");
        assert_eq!(question.answer, "New.");
    }

    #[tokio::test]
    async fn increment_on_missing_question_is_row_not_found() {
        let pool = create_test_db().await.unwrap();
        let err = increment_visits(&pool, 1234).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_lose_nothing() {
        // File-backed pool so increments genuinely run on parallel connections.
        let (pool, _guard) = create_test_db_file().await.unwrap();
        let category = create_category(&pool, "Dormitory").await.unwrap();
        let id = create_question(&pool, category, "Popular?", "Very.")
            .await
            .unwrap();

        let n = 20;
        let mut handles = Vec::new();
        for _ in 0..n {
            let pool = pool.clone();
            handles.push(tokio::spawn(
                async move { increment_visits(&pool, id).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let question = get_question(&pool, id).await.unwrap();
        assert_eq!(question.visit_count, n);
    }

    #[tokio::test]
    async fn visit_ordering_is_descending_with_id_tie_break() {
        let pool = create_test_db().await.unwrap();
        let category = create_category(&pool, "General").await.unwrap();
        let first = create_question(&pool, category, "First?", "A").await.unwrap();
        let second = create_question(&pool, category, "Second?", "B").await.unwrap();
        let third = create_question(&pool, category, "Third?", "C").await.unwrap();

        increment_visits(&pool, second).await.unwrap();
        increment_visits(&pool, second).await.unwrap();
        increment_visits(&pool, third).await.unwrap();
        increment_visits(&pool, first).await.unwrap();

        let stats = get_questions_by_visits(&pool, None).await.unwrap();
        let ids: Vec<i64> = stats.iter().map(|s| s.id).collect();
        // second leads; first and third tie on 1 visit and keep insertion order
        assert_eq!(ids, vec![second, first, third]);
        assert!(stats.windows(2).all(|w| w[0].visit_count >= w[1].visit_count));
        assert_eq!(stats[0].category_name, "General");

        let top_two = get_questions_by_visits(&pool, Some(2)).await.unwrap();
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0].id, second);
    }
}
