use async_trait::async_trait;
use rand::RngCore;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{channel::effective_announce, Channel, ChannelCredential, OwnerId},
    Error, Result,
};

use super::{ChannelStore, FindColumn};

/// Channel registry backed by the `channels` and `owners` tables
#[derive(Clone)]
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_channel(&self, row: &PgRow) -> Result<Channel> {
        Ok(Channel {
            owner_id: OwnerId(row.try_get("owner_id")?),
            name: row.try_get("name")?,
            secret: row.try_get("secret")?,
            ftl_id: row.try_get("ftl_id")?,
            announce: row.try_get("announce")?,
        })
    }
}

/// Generate a channel ingest secret: 24 random bytes, hex-encoded.
/// Collision probability is negligible at this size.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
impl ChannelStore for ChannelRepository {
    async fn channels_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Channel>> {
        let rows = sqlx::query(
            r"
            SELECT owner_id, name, secret, ftl_id, announce
            FROM channels
            WHERE owner_id = $1
            ORDER BY name
            ",
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| self.row_to_channel(row)).collect()
    }

    async fn create_channel(&self, owner_id: &OwnerId, name: &str) -> Result<Channel> {
        let secret = generate_secret();
        let row = sqlx::query(
            r"
            INSERT INTO channels (owner_id, name, secret, announce)
            VALUES ($1, $2, $3, TRUE)
            RETURNING owner_id, name, secret, ftl_id, announce
            ",
        )
        .bind(owner_id.as_str())
        .bind(name)
        .bind(&secret)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("channel name {name:?} already in use"))
            }
            _ => Error::Database(e),
        })?;

        self.row_to_channel(&row)
    }

    async fn set_announce(&self, owner_id: &OwnerId, name: &str, announce: bool) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE channels
            SET announce = $3
            WHERE owner_id = $1 AND name = $2
            ",
        )
        .bind(owner_id.as_str())
        .bind(name)
        .bind(announce)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("channel {name:?}")));
        }
        Ok(())
    }

    async fn delete_channel(&self, owner_id: &OwnerId, name: &str) -> Result<()> {
        sqlx::query("DELETE FROM channels WHERE owner_id = $1 AND name = $2")
            .bind(owner_id.as_str())
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_channel(&self, column: FindColumn, value: &str) -> Result<ChannelCredential> {
        // Lookup column is a closed enum; each variant has its own full
        // query string so no identifier is ever interpolated.
        let query = match column {
            FindColumn::Name => {
                r"
                SELECT c.owner_id, c.name, c.secret,
                       c.announce AS channel_announce, o.announce AS owner_announce
                FROM channels c
                LEFT JOIN owners o USING (owner_id)
                WHERE c.name = $1
                "
            }
            FindColumn::FtlId => {
                r"
                SELECT c.owner_id, c.name, c.secret,
                       c.announce AS channel_announce, o.announce AS owner_announce
                FROM channels c
                LEFT JOIN owners o USING (owner_id)
                WHERE c.ftl_id = $1
                "
            }
        };

        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("channel".to_string()))?;

        let channel_announce: bool = row.try_get("channel_announce")?;
        let owner_announce: Option<bool> = row.try_get("owner_announce")?;

        Ok(ChannelCredential {
            owner_id: OwnerId(row.try_get("owner_id")?),
            name: row.try_get("name")?,
            secret: row.try_get("secret")?,
            announce: effective_announce(channel_announce, owner_announce),
        })
    }

    async fn set_owner_announce(&self, owner_id: &OwnerId, announce: bool) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO owners (owner_id, announce)
            VALUES ($1, $2)
            ON CONFLICT (owner_id) DO UPDATE SET announce = EXCLUDED.announce
            ",
        )
        .bind(owner_id.as_str())
        .bind(announce)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_secret_distinct() {
        assert_ne!(generate_secret(), generate_secret());
    }
}
