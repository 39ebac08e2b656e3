use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

const COLUMNS: &str = "id, client_id, user_id, angle_title, typology_name, content, \
     created_at, updated_at";

/// A generated or hand-edited video script. The marketing angle is referenced
/// by title and the user typology by name; both are string keys into data
/// that lives outside this table, so renames orphan old rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Script {
    pub id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub angle_title: String,
    /// Absent on scripts saved through the legacy angle-only flow.
    pub typology_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateScript {
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub angle_title: String,
    pub typology_name: Option<String>,
    pub content: String,
}

impl Script {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE id = $1");
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_client_id(
        pool: &SqlitePool,
        client_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM scripts WHERE client_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Script>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateScript,
        script_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO scripts (id, client_id, user_id, angle_title, typology_name, content) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(script_id)
            .bind(data.client_id)
            .bind(data.user_id)
            .bind(&data.angle_title)
            .bind(&data.typology_name)
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
            "UPDATE scripts SET content = $2, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scripts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::models::client::{Client, CreateClient};

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    async fn seed_client(pool: &SqlitePool, user_id: Uuid) -> Client {
        Client::create(
            pool,
            &CreateClient {
                user_id,
                product_name: "Rice Cooker".to_string(),
                country: "Cambodia".to_string(),
                price: "$35".to_string(),
                status: None,
                problems: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                target_customers: "families".to_string(),
                warranty: "1 year".to_string(),
                promotion: "free delivery".to_string(),
                uniqueness: "fast cooking".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_update_delete() {
        let pool = test_pool().await;
        let user_id = Uuid::new_v4();
        let client = seed_client(&pool, user_id).await;

        let script = Script::create(
            &pool,
            &CreateScript {
                client_id: client.id,
                user_id,
                angle_title: "Storytelling".to_string(),
                typology_name: None,
                content: "original".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert!(script.typology_name.is_none());

        let updated = Script::update_content(&pool, script.id, "edited")
            .await
            .unwrap();
        assert_eq!(updated.content, "edited");

        assert_eq!(Script::delete(&pool, script.id).await.unwrap(), 1);
        assert!(
            Script::find_by_client_id(&pool, client.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
