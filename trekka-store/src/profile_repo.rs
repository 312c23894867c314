use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trekka_core::repository::UserDirectory;
use trekka_core::{Profile, StoreError};

use crate::database::backend;

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    display_name: Option<String>,
    email_import_id: String,
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_import_token(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        sqlx::query_scalar("SELECT id FROM profiles WHERE LOWER(email_import_id) = LOWER($1)")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT id, username, display_name, email_import_id FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(|r| Profile {
            id: r.id,
            username: r.username,
            display_name: r.display_name,
            email_import_id: r.email_import_id,
        }))
    }
}
