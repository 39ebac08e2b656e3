//! Branding content: topic suggestions and topic-keyed scripts.

use db::models::branding_script::{BrandingScript, CreateBrandingScript};
use db::models::client::Client;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::angles::find_branding_angle;
use super::gemini_api::GeminiApiError;
use super::generation::ScriptGenerator;

#[derive(Debug, Error)]
pub enum BrandingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generation error: {0}")]
    Generation(#[from] GeminiApiError),
    #[error("client not found")]
    ClientNotFound,
    #[error("script not found")]
    ScriptNotFound,
    #[error("unknown viral angle: {0}")]
    UnknownAngle(String),
    #[error("topic is required")]
    TopicRequired,
}

pub struct BrandingService {
    pool: SqlitePool,
    generator: ScriptGenerator,
}

impl BrandingService {
    pub fn new(pool: SqlitePool, generator: ScriptGenerator) -> Self {
        Self { pool, generator }
    }

    /// Suggest five topics for the client's offer. Suggestions are not
    /// persisted; the user picks or types a topic before generating.
    pub async fn suggest_topics(&self, client_id: Uuid) -> Result<Vec<String>, BrandingError> {
        let client = self.load_client(client_id).await?;
        Ok(self.generator.generate_branding_topics(&client).await?)
    }

    /// Generate a branding script for a topic and persist it immediately.
    /// The optional viral angle only reframes the opening of the script.
    pub async fn create_script(
        &self,
        client_id: Uuid,
        topic: &str,
        angle_title: Option<&str>,
    ) -> Result<BrandingScript, BrandingError> {
        if topic.trim().is_empty() {
            return Err(BrandingError::TopicRequired);
        }
        let angle = match angle_title {
            Some(title) => Some(
                find_branding_angle(title)
                    .ok_or_else(|| BrandingError::UnknownAngle(title.to_string()))?,
            ),
            None => None,
        };

        let client = self.load_client(client_id).await?;
        let content = self
            .generator
            .generate_branding_script(topic, angle.as_ref())
            .await?;

        let script = BrandingScript::create(
            &self.pool,
            &CreateBrandingScript {
                client_id,
                user_id: client.user_id,
                topic: topic.to_string(),
                content,
            },
            Uuid::new_v4(),
        )
        .await?;
        info!(client_id = %client_id, script_id = %script.id, "Saved branding script");
        Ok(script)
    }

    pub async fn list(&self, client_id: Uuid) -> Result<Vec<BrandingScript>, BrandingError> {
        Ok(BrandingScript::find_by_client_id(&self.pool, client_id).await?)
    }

    pub async fn update_content(
        &self,
        script_id: Uuid,
        content: &str,
    ) -> Result<BrandingScript, BrandingError> {
        BrandingScript::find_by_id(&self.pool, script_id)
            .await?
            .ok_or(BrandingError::ScriptNotFound)?;
        Ok(BrandingScript::update_content(&self.pool, script_id, content).await?)
    }

    pub async fn delete(&self, script_id: Uuid) -> Result<(), BrandingError> {
        let deleted = BrandingScript::delete(&self.pool, script_id).await?;
        if deleted == 0 {
            return Err(BrandingError::ScriptNotFound);
        }
        Ok(())
    }

    async fn load_client(&self, client_id: Uuid) -> Result<Client, BrandingError> {
        Client::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(BrandingError::ClientNotFound)
    }
}

#[cfg(test)]
mod tests {
    use db::models::client::CreateClient;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::services::gemini_api::GeminiApiClient;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn test_service(pool: SqlitePool) -> BrandingService {
        let gemini = GeminiApiClient::new("test-key".to_string(), None).unwrap();
        BrandingService::new(pool, ScriptGenerator::new(gemini))
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_before_any_call() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let err = service
            .create_script(Uuid::new_v4(), "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BrandingError::TopicRequired));
    }

    #[tokio::test]
    async fn unknown_viral_angle_is_rejected_before_any_call() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let err = service
            .create_script(Uuid::new_v4(), "topic", Some("Not An Angle"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrandingError::UnknownAngle(_)));
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = Client::create(
            &pool,
            &CreateClient {
                user_id: Uuid::new_v4(),
                product_name: "Herbal Shampoo".to_string(),
                country: "Cambodia".to_string(),
                price: "$12".to_string(),
                status: None,
                problems: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                target_customers: "t".to_string(),
                warranty: "w".to_string(),
                promotion: "p".to_string(),
                uniqueness: "u".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let script = BrandingScript::create(
            &pool,
            &CreateBrandingScript {
                client_id: client.id,
                user_id: client.user_id,
                topic: "daily habits".to_string(),
                content: "original".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let updated = service.update_content(script.id, "edited").await.unwrap();
        assert_eq!(updated.content, "edited");

        service.delete(script.id).await.unwrap();
        assert!(service.list(client.id).await.unwrap().is_empty());
        assert!(matches!(
            service.delete(script.id).await.unwrap_err(),
            BrandingError::ScriptNotFound
        ));
    }
}
