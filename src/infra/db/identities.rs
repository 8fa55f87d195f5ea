use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateIdentityParams, IdentitiesRepo, RepoError};
use crate::domain::entities::IdentityRecord;

use super::{PostgresRepositories, map_sqlx_error};

const IDENTITY_COLUMNS: &str = "id, email, display_name, avatar_url, created_at";

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    created_at: OffsetDateTime,
}

impl From<IdentityRow> for IdentityRecord {
    fn from(row: IdentityRow) -> Self {
        IdentityRecord {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IdentitiesRepo for PostgresRepositories {
    async fn create_identity(
        &self,
        params: CreateIdentityParams,
    ) -> Result<IdentityRecord, RepoError> {
        let sql = format!(
            "INSERT INTO identities (id, email, display_name, avatar_url, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {IDENTITY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, IdentityRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&params.email)
            .bind(&params.display_name)
            .bind(&params.avatar_url)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<IdentityRecord>, RepoError> {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }
}
