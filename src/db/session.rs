use sqlx::SqlitePool;

use crate::utils::error::Result;

const AUTH_TOKEN: &str = "auth_token";
const USER_ID: &str = "user_id";

/// Persisted login state.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, token: &str, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in [(AUTH_TOKEN, token), (USER_ID, user_id)] {
            sqlx::query(
                "INSERT INTO session (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn token(&self) -> Result<Option<String>> {
        self.value(AUTH_TOKEN).await
    }

    pub async fn user_id(&self) -> Result<Option<String>> {
        self.value(USER_ID).await
    }

    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM session").execute(&self.pool).await?;
        Ok(())
    }

    async fn value(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM session WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }
}
