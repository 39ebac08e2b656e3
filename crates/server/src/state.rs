use std::sync::Arc;

use services::services::{
    branding::BrandingService, flow::ContentFlowService, gemini_api::GeminiApiClient,
    generation::ScriptGenerator, immersion::ImmersionService,
};
use sqlx::SqlitePool;

/// Shared application state. The flow service lives here because its
/// sessions must outlive individual requests; the other services are cheap
/// and get built per handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    gemini: GeminiApiClient,
    pub flow: Arc<ContentFlowService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, gemini: GeminiApiClient) -> Self {
        let flow = Arc::new(ContentFlowService::new(
            pool.clone(),
            ScriptGenerator::new(gemini.clone()),
        ));
        Self { pool, gemini, flow }
    }

    pub fn generator(&self) -> ScriptGenerator {
        ScriptGenerator::new(self.gemini.clone())
    }

    pub fn immersion_service(&self) -> ImmersionService {
        ImmersionService::new(self.pool.clone(), self.generator())
    }

    pub fn branding_service(&self) -> BrandingService {
        BrandingService::new(self.pool.clone(), self.generator())
    }
}
