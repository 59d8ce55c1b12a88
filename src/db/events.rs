use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Event;
use crate::utils::error::Result;

const EVENT_COLUMNS: &str = "id, title, description, game_type, date, time, location, \
                             max_participants, creator_id, is_synced";

/// Event rows of the offline cache.
#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or overwrites an event. An existing row keeps its position in
    /// insertion order.
    pub async fn upsert(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, title, description, game_type, date, time, location,
                                 max_participants, creator_id, is_synced)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                game_type = excluded.game_type,
                date = excluded.date,
                time = excluded.time,
                location = excluded.location,
                max_participants = excluded.max_participants,
                creator_id = excluded.creator_id,
                is_synced = excluded.is_synced",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.game_type)
        .bind(event.date)
        .bind(event.time)
        .bind(&event.location)
        .bind(event.max_participants)
        .bind(&event.creator_id)
        .bind(event.is_synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = ?",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Most recent date first.
    pub async fn list(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY date DESC, time DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    pub async fn list_by_creator(&self, user_id: &str) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE creator_id = ? ORDER BY date DESC, time DESC",
            EVENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    pub async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Event>> {
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(event) = self.get(*id).await? {
                events.push(event);
            }
        }
        events.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(events)
    }

    /// Rows whose last write never reached the backend, oldest first.
    pub async fn list_unsynced(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE is_synced = 0 ORDER BY rowid",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    pub async fn count_unsynced(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE is_synced = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Flags the row synced only if it still holds exactly what was pushed.
    /// Returns `false` when a newer local write replaced it in the meantime.
    pub async fn mark_synced_if_unchanged(&self, pushed: &Event) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE events SET is_synced = 1
             WHERE id = ? AND title = ? AND description = ? AND game_type = ?
               AND date = ? AND time = ? AND location = ?
               AND max_participants = ? AND creator_id = ?",
        )
        .bind(pushed.id)
        .bind(&pushed.title)
        .bind(&pushed.description)
        .bind(&pushed.game_type)
        .bind(pushed.date)
        .bind(pushed.time)
        .bind(&pushed.location)
        .bind(pushed.max_participants)
        .bind(&pushed.creator_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Merges a server listing into the cache. Local edits that have not
    /// been pushed yet are left alone.
    pub async fn replace_from_remote(&self, events: &[Event]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for event in events {
            let result = sqlx::query(
                "INSERT INTO events (id, title, description, game_type, date, time, location,
                                     max_participants, creator_id, is_synced)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    game_type = excluded.game_type,
                    date = excluded.date,
                    time = excluded.time,
                    location = excluded.location,
                    max_participants = excluded.max_participants,
                    creator_id = excluded.creator_id,
                    is_synced = 1
                 WHERE events.is_synced = 1",
            )
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.game_type)
            .bind(event.date)
            .bind(event.time)
            .bind(&event.location)
            .bind(event.max_participants)
            .bind(&event.creator_id)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::event::fixtures::event;

    async fn store() -> EventStore {
        EventStore::new(test_pool().await)
    }

    #[tokio::test]
    async fn test_create_then_read_returns_same_fields() {
        let store = store().await;
        let ev = event("Magic tournament", "2025-09-24", "user-1");

        store.upsert(&ev).await.unwrap();
        let loaded = store.get(ev.id).await.unwrap().unwrap();
        assert_eq!(loaded, ev);
    }

    #[tokio::test]
    async fn test_update_overwrites_prior_values() {
        let store = store().await;
        let mut ev = event("Magic tournament", "2025-09-24", "user-1");
        store.upsert(&ev).await.unwrap();

        ev.title = "Magic finals".to_string();
        ev.max_participants = 8;
        ev.is_synced = true;
        store.upsert(&ev).await.unwrap();

        let loaded = store.get(ev.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Magic finals");
        assert_eq!(loaded.max_participants, 8);
        assert!(loaded.is_synced);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_the_row() {
        let store = store().await;
        let ev = event("Catan night", "2025-10-03", "user-1");
        store.upsert(&ev).await.unwrap();

        assert!(store.delete(ev.id).await.unwrap());
        assert!(store.get(ev.id).await.unwrap().is_none());
        assert!(!store.delete(ev.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_orders_by_date_descending() {
        let store = store().await;
        let early = event("Early", "2025-01-10", "user-1");
        let late = event("Late", "2025-12-10", "user-2");
        let middle = event("Middle", "2025-06-10", "user-1");
        for ev in [&early, &late, &middle] {
            store.upsert(ev).await.unwrap();
        }

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Late", "Middle", "Early"]);

        let mine = store.list_by_creator("user-1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].title, "Middle");
    }

    #[tokio::test]
    async fn test_unsynced_rows_come_back_in_insertion_order() {
        let store = store().await;
        let first = event("First", "2025-12-01", "user-1");
        let mut synced = event("Synced", "2025-11-01", "user-1");
        synced.is_synced = true;
        let second = event("Second", "2025-01-01", "user-1");

        for ev in [&first, &synced, &second] {
            store.upsert(ev).await.unwrap();
        }
        // Rewriting a row must not move it to the back.
        store.upsert(&first).await.unwrap();

        let pending: Vec<Uuid> = store
            .list_unsynced()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(pending, vec![first.id, second.id]);
        assert_eq!(store.count_unsynced().await.unwrap(), 2);

        assert!(store.mark_synced_if_unchanged(&first).await.unwrap());
        assert_eq!(store.count_unsynced().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_synced_skips_rows_edited_since_push() {
        let store = store().await;
        let pushed = event("Pushed copy", "2025-09-24", "user-1");
        store.upsert(&pushed).await.unwrap();

        let mut newer = pushed.clone();
        newer.location = "Moved to the library".to_string();
        store.upsert(&newer).await.unwrap();

        assert!(!store.mark_synced_if_unchanged(&pushed).await.unwrap());
        assert!(!store.get(pushed.id).await.unwrap().unwrap().is_synced);
        assert!(store.mark_synced_if_unchanged(&newer).await.unwrap());
    }

    #[tokio::test]
    async fn test_remote_merge_keeps_unsynced_local_edits() {
        let store = store().await;
        let mut local = event("Local edit", "2025-09-24", "user-1");
        store.upsert(&local).await.unwrap();

        let mut cached = event("Cached", "2025-09-25", "user-2");
        cached.is_synced = true;
        store.upsert(&cached).await.unwrap();

        local.title = "Server copy".to_string();
        cached.title = "Cached, renamed on server".to_string();
        let fresh = event("Fresh", "2025-09-26", "user-3");

        let written = store
            .replace_from_remote(&[local.clone(), cached.clone(), fresh.clone()])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let kept = store.get(local.id).await.unwrap().unwrap();
        assert_eq!(kept.title, "Local edit");
        assert!(!kept.is_synced);

        let updated = store.get(cached.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "Cached, renamed on server");

        let inserted = store.get(fresh.id).await.unwrap().unwrap();
        assert!(inserted.is_synced);
    }
}
