/// Redis-backed key-value storage that degrades to a no-op.
///
/// Reads return `None` and writes return `false` when Redis is not configured or an
/// operation fails; the failure is logged as a warning. Callers keep working from their
/// in-memory state and only lose durability across restarts.
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::warn;

#[derive(Clone)]
pub struct RedisStore {
    client: Option<redis::Client>,
}

impl RedisStore {
    /// Create a store for `url`. A missing or malformed URL yields a disabled store.
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "invalid redis url, persistence disabled"))
                .ok()
        });
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// PING the server.
    pub async fn is_available(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()?;
        value
    }

    /// Store `value` under `key` without expiry.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set::<_, _, ()>(key, value)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SET failed"))
            .is_ok()
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        self.client
            .as_ref()?
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::RedisStore;

    #[tokio::test]
    async fn disabled_store_misses_and_refuses_writes() {
        let store = RedisStore::disabled();
        assert!(!store.is_available().await);
        assert_eq!(store.get("standards-bookmarks").await, None);
        assert!(!store.set("standards-bookmarks", "[]").await);
    }

    #[tokio::test]
    async fn missing_url_disables_store() {
        assert!(!RedisStore::new(None).is_available().await);
    }

    #[tokio::test]
    async fn malformed_url_disables_store() {
        let store = RedisStore::new(Some("not a redis url"));
        assert_eq!(store.get("k").await, None);
    }
}
