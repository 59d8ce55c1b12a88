use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::utils::error::Result;

/// Which users joined which events.
#[derive(Clone)]
pub struct RsvpStore {
    pool: SqlitePool,
}

impl RsvpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn join(&self, event_id: Uuid, user_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO rsvps (event_id, user_id, joined_at) VALUES (?, ?, ?)
             ON CONFLICT(event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn leave(&self, event_id: Uuid, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM rsvps WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_joined(&self, event_id: Uuid, user_id: &str) -> Result<bool> {
        let (joined,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM rsvps WHERE event_id = ? AND user_id = ?)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(joined)
    }

    pub async fn count(&self, event_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rsvps WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// User ids in join order.
    pub async fn participants(&self, event_id: Uuid) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM rsvps WHERE event_id = ? ORDER BY joined_at, rowid",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn joined_event_ids(&self, user_id: &str) -> Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT event_id FROM rsvps WHERE user_id = ? ORDER BY joined_at, rowid")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
