//! PostgreSQL-backed metadata source.
//!
//! Reads the game profile linked to a Discord account from the `profiles`
//! table and renders it with [`LinkedProfile::to_document`].
//!
//! # Example
//!
//! ```no_run
//! use linked_roles_discord::stores::PostgresMetadataSource;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/linked_roles").await?;
//! let source = PostgresMetadataSource::new(pool);
//! source.migrate().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{LinkedRoleError, Result};
use crate::metadata::{LinkedProfile, MetadataDocument};
use crate::providers::MetadataSource;
use crate::state::UserId;
use sqlx::PgPool;

/// `PostgreSQL` metadata source.
#[derive(Debug, Clone)]
pub struct PostgresMetadataSource {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    profile_visible: bool,
    connected: bool,
    connected_date: Option<String>,
    level: Option<i64>,
}

impl From<ProfileRow> for LinkedProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            profile_visible: row.profile_visible,
            connected: row.connected,
            connected_date: row.connected_date,
            level: row.level,
        }
    }
}

impl PostgresMetadataSource {
    /// Create a new `PostgreSQL` metadata source.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LinkedRoleError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Load the profile linked to `user_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Storage`] if the query fails.
    pub async fn profile(&self, user_id: &UserId) -> Result<Option<LinkedProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT profile_visible, connected, connected_date, level
            FROM profiles
            WHERE discord_user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LinkedRoleError::Storage(format!("Failed to load profile: {e}")))?;

        Ok(row.map(LinkedProfile::from))
    }
}

impl MetadataSource for PostgresMetadataSource {
    async fn compute_metadata(&self, user_id: &UserId) -> Result<MetadataDocument> {
        let profile = self.profile(user_id).await?.unwrap_or_else(|| {
            tracing::debug!(user_id = %user_id, "No game profile linked, sending empty metadata");
            LinkedProfile::default()
        });

        Ok(profile.to_document())
    }
}
