use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

const COLUMNS: &str = "id, client_id, user_id, topic, content, created_at, updated_at";

/// An educational/non-sales short-video script, keyed by a free-text topic
/// instead of an angle+typology pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BrandingScript {
    pub id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateBrandingScript {
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub content: String,
}

impl BrandingScript {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branding_scripts WHERE id = $1");
        sqlx::query_as::<_, BrandingScript>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_client_id(
        pool: &SqlitePool,
        client_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM branding_scripts WHERE client_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, BrandingScript>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateBrandingScript,
        script_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO branding_scripts (id, client_id, user_id, topic, content) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BrandingScript>(&query)
            .bind(script_id)
            .bind(data.client_id)
            .bind(data.user_id)
            .bind(&data.topic)
            .bind(&data.content)
            .fetch_one(pool)
            .await
    }

    pub async fn update_content(
        pool: &SqlitePool,
        id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "UPDATE branding_scripts SET content = $2, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BrandingScript>(&query)
            .bind(id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM branding_scripts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
