use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Comment;
use crate::utils::error::Result;

#[derive(Clone)]
pub struct CommentStore {
    pool: SqlitePool,
}

impl CommentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, event_id, author_id, text, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.event_id)
        .bind(&comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Oldest first.
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, event_id, author_id, text, created_at FROM comments
             WHERE event_id = ? ORDER BY created_at, rowid",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }
}
