use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{models::LiveChannel, Error, Result};

use super::LivenessStore;

/// Thumbnail/liveness rows, one per channel that has ever published.
/// Rows are never deleted; stale entries simply sink in the directory order.
#[derive(Clone)]
pub struct LivenessRepository {
    pool: PgPool,
}

impl LivenessRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LivenessStore for LivenessRepository {
    async fn thumbnail(&self, name: &str) -> Result<Vec<u8>> {
        let row = sqlx::query("SELECT thumbnail FROM liveness WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("thumbnail for {name:?}")))?;

        Ok(row.try_get("thumbnail")?)
    }

    async fn put_thumbnail(&self, name: &str, data: &[u8]) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO liveness (name, thumbnail, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (name) DO UPDATE
                SET thumbnail = EXCLUDED.thumbnail, updated_at = now()
            ",
        )
        .bind(name)
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_liveness(&self) -> Result<Vec<LiveChannel>> {
        let rows = sqlx::query("SELECT name, updated_at FROM liveness")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(LiveChannel {
                    name: row.try_get("name")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }
}
