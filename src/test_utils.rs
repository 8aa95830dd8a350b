pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for tests that need
    /// several connections working in parallel
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a user with a properly hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        name: &str,
        surname: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = crate::auth::password::hash_password(password).map_err(|e| {
            sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
        })?;

        crate::db::queries::users::create_user(pool, name, surname, email, &password_hash, "user")
            .await
    }
}
