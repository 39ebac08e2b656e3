//! Session-scoped selection flow for script creation.
//!
//! Each session walks a client through: immersion research, picking one user
//! typology, picking one marketing angle, generating an editable draft, and
//! saving it. Sessions live in memory only; nothing here survives a restart
//! except what the store already holds.

use dashmap::DashMap;
use db::models::client::Client;
use db::models::immersion::{ImmersionData, UserTypology};
use db::models::script::{CreateScript, Script};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::angles::{MarketingAngle, find_content_angle};
use super::gemini_api::GeminiApiError;
use super::generation::ScriptGenerator;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generation error: {0}")]
    Generation(#[from] GeminiApiError),
    #[error("flow session not found")]
    SessionNotFound,
    #[error("client not found")]
    ClientNotFound,
    #[error("script not found")]
    ScriptNotFound,
    #[error("no immersion research for this client")]
    ImmersionMissing,
    #[error("select a user typology first")]
    TypologyRequired,
    #[error("select a marketing angle first")]
    AngleRequired,
    #[error("unknown marketing angle: {0}")]
    UnknownAngle(String),
    #[error("unknown user typology: {0}")]
    UnknownTypology(String),
    #[error("no script is open for editing")]
    NoOpenScript,
    #[error("script content is empty")]
    EmptyDraft,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FlowState {
    #[default]
    NoImmersion,
    ImmersionReady,
    TypologySelected,
    AngleSelected,
    ScriptGenerated,
    Saved,
}

/// Which script template to generate from the accumulated context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScriptKind {
    Content,
    Sale,
}

#[derive(Debug, Clone)]
struct ContentSession {
    client_id: Uuid,
    state: FlowState,
    typology: Option<UserTypology>,
    angle: Option<MarketingAngle>,
    guidance: String,
    draft: String,
    editing_script_id: Option<Uuid>,
}

/// Public view of one session.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct FlowSnapshot {
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub state: FlowState,
    pub typology_name: Option<String>,
    pub angle_title: Option<String>,
    pub guidance: String,
    pub draft: String,
    pub editing_script_id: Option<Uuid>,
}

fn snapshot_of(session_id: Uuid, session: &ContentSession) -> FlowSnapshot {
    FlowSnapshot {
        session_id,
        client_id: session.client_id,
        state: session.state,
        typology_name: session.typology.as_ref().map(|t| t.typology_name.clone()),
        angle_title: session.angle.as_ref().map(|a| a.title.clone()),
        guidance: session.guidance.clone(),
        draft: session.draft.clone(),
        editing_script_id: session.editing_script_id,
    }
}

pub struct ContentFlowService {
    pool: SqlitePool,
    generator: ScriptGenerator,
    sessions: DashMap<Uuid, ContentSession>,
}

impl ContentFlowService {
    pub fn new(pool: SqlitePool, generator: ScriptGenerator) -> Self {
        Self {
            pool,
            generator,
            sessions: DashMap::new(),
        }
    }

    /// Open a new session for a client. The starting state depends on
    /// whether the client already has a stored immersion report.
    pub async fn start(&self, client_id: Uuid) -> Result<FlowSnapshot, FlowError> {
        let client = Client::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(FlowError::ClientNotFound)?;

        let state = if client.parsed_immersion().is_some() {
            FlowState::ImmersionReady
        } else {
            FlowState::NoImmersion
        };
        let session = ContentSession {
            client_id,
            state,
            typology: None,
            angle: None,
            guidance: String::new(),
            draft: String::new(),
            editing_script_id: None,
        };

        let session_id = Uuid::new_v4();
        let snapshot = snapshot_of(session_id, &session);
        self.sessions.insert(session_id, session);
        info!(session_id = %session_id, client_id = %client_id, "Opened content flow session");
        Ok(snapshot)
    }

    pub fn snapshot(&self, session_id: Uuid) -> Result<FlowSnapshot, FlowError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(FlowError::SessionNotFound)?;
        Ok(snapshot_of(session_id, &session))
    }

    fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut ContentSession) -> Result<T, FlowError>,
    ) -> Result<T, FlowError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(FlowError::SessionNotFound)?;
        f(&mut session)
    }

    fn session_view(&self, session_id: Uuid) -> Result<ContentSession, FlowError> {
        self.sessions
            .get(&session_id)
            .map(|s| s.value().clone())
            .ok_or(FlowError::SessionNotFound)
    }

    /// Generate (or regenerate) the immersion report and persist it onto the
    /// client. Any previous report is replaced wholesale; a failure leaves
    /// both the stored report and the session state untouched. Regeneration
    /// invalidates the current typology/angle selection, since the typologies
    /// it referred to no longer exist.
    pub async fn generate_immersion(
        &self,
        session_id: Uuid,
    ) -> Result<ImmersionData, FlowError> {
        let view = self.session_view(session_id)?;
        let client = Client::find_by_id(&self.pool, view.client_id)
            .await?
            .ok_or(FlowError::ClientNotFound)?;

        let report = self.generator.generate_immersion(&client).await?;
        Client::set_immersion(&self.pool, view.client_id, Some(&report)).await?;

        self.with_session(session_id, |session| {
            session.state = FlowState::ImmersionReady;
            session.typology = None;
            session.angle = None;
            session.draft.clear();
            session.editing_script_id = None;
            Ok(())
        })?;
        info!(session_id = %session_id, client_id = %view.client_id, "Immersion generated in flow");
        Ok(report)
    }

    /// Clear the stored report. Scripts saved against its typology names are
    /// left untouched; their references simply dangle.
    pub async fn delete_immersion(&self, session_id: Uuid) -> Result<(), FlowError> {
        let view = self.session_view(session_id)?;
        Client::find_by_id(&self.pool, view.client_id)
            .await?
            .ok_or(FlowError::ClientNotFound)?;
        Client::set_immersion(&self.pool, view.client_id, None).await?;

        self.with_session(session_id, |session| {
            session.state = FlowState::NoImmersion;
            session.typology = None;
            session.angle = None;
            session.draft.clear();
            session.editing_script_id = None;
            Ok(())
        })
    }

    /// Pick one of the client's generated typologies by name. Pure selection;
    /// the only store access is re-reading the report it must come from.
    pub async fn select_typology(
        &self,
        session_id: Uuid,
        typology_name: &str,
    ) -> Result<FlowSnapshot, FlowError> {
        let view = self.session_view(session_id)?;
        let client = Client::find_by_id(&self.pool, view.client_id)
            .await?
            .ok_or(FlowError::ClientNotFound)?;
        let report = client
            .parsed_immersion()
            .ok_or(FlowError::ImmersionMissing)?;
        let typology = report
            .user_typologies
            .into_iter()
            .find(|t| t.typology_name == typology_name)
            .ok_or_else(|| FlowError::UnknownTypology(typology_name.to_string()))?;

        self.with_session(session_id, |session| {
            session.typology = Some(typology);
            session.angle = None;
            session.draft.clear();
            session.editing_script_id = None;
            session.state = FlowState::TypologySelected;
            Ok(snapshot_of(session_id, session))
        })
    }

    /// Pick a marketing angle from the content catalog. Entering angle
    /// selection without a typology sends the caller back to typology
    /// selection instead.
    pub fn select_angle(&self, session_id: Uuid, title: &str) -> Result<FlowSnapshot, FlowError> {
        let angle = find_content_angle(title).ok_or_else(|| FlowError::UnknownAngle(title.to_string()))?;
        self.with_session(session_id, |session| {
            if session.typology.is_none() {
                return Err(FlowError::TypologyRequired);
            }
            session.angle = Some(angle);
            session.state = FlowState::AngleSelected;
            Ok(snapshot_of(session_id, session))
        })
    }

    pub fn set_guidance(&self, session_id: Uuid, guidance: &str) -> Result<FlowSnapshot, FlowError> {
        self.with_session(session_id, |session| {
            session.guidance = guidance.to_string();
            Ok(snapshot_of(session_id, session))
        })
    }

    /// Generate a script draft from the accumulated context. Allowed once an
    /// angle is selected, and again afterwards to regenerate; the previous
    /// draft is discarded.
    pub async fn generate(&self, session_id: Uuid, kind: ScriptKind) -> Result<String, FlowError> {
        let view = self.session_view(session_id)?;
        let angle = view.angle.clone().ok_or(FlowError::AngleRequired)?;

        let client = Client::find_by_id(&self.pool, view.client_id)
            .await?
            .ok_or(FlowError::ClientNotFound)?;

        let text = match kind {
            ScriptKind::Content => {
                self.generator
                    .generate_content_script(
                        &client,
                        &angle,
                        view.typology.as_ref(),
                        &view.guidance,
                    )
                    .await?
            }
            ScriptKind::Sale => {
                self.generator
                    .generate_sale_script(&client, &angle, view.typology.as_ref(), &view.guidance)
                    .await?
            }
        };

        self.with_session(session_id, |session| {
            session.draft = text.clone();
            session.editing_script_id = None;
            session.state = FlowState::ScriptGenerated;
            Ok(())
        })?;
        Ok(text)
    }

    /// Load a saved script into the editable buffer, bypassing generation.
    /// Available from any state.
    pub async fn edit_script(
        &self,
        session_id: Uuid,
        script_id: Uuid,
    ) -> Result<FlowSnapshot, FlowError> {
        let view = self.session_view(session_id)?;
        let script = Script::find_by_id(&self.pool, script_id)
            .await?
            .filter(|s| s.client_id == view.client_id)
            .ok_or(FlowError::ScriptNotFound)?;

        self.with_session(session_id, |session| {
            session.draft = script.content.clone();
            session.editing_script_id = Some(script.id);
            session.state = FlowState::ScriptGenerated;
            Ok(snapshot_of(session_id, session))
        })
    }

    /// Replace the draft with user edits.
    pub fn update_draft(&self, session_id: Uuid, content: &str) -> Result<FlowSnapshot, FlowError> {
        self.with_session(session_id, |session| {
            if session.state != FlowState::ScriptGenerated {
                return Err(FlowError::NoOpenScript);
            }
            session.draft = content.to_string();
            Ok(snapshot_of(session_id, session))
        })
    }

    /// Persist the draft: a new Script record, or an in-place content update
    /// when a saved script was loaded for editing. The buffer is cleared on
    /// success.
    pub async fn save(&self, session_id: Uuid) -> Result<Script, FlowError> {
        let view = self.session_view(session_id)?;
        if view.draft.trim().is_empty() {
            return Err(FlowError::EmptyDraft);
        }

        let script = if let Some(script_id) = view.editing_script_id {
            Script::update_content(&self.pool, script_id, &view.draft).await?
        } else {
            let angle = view.angle.as_ref().ok_or(FlowError::AngleRequired)?;
            let client = Client::find_by_id(&self.pool, view.client_id)
                .await?
                .ok_or(FlowError::ClientNotFound)?;
            Script::create(
                &self.pool,
                &CreateScript {
                    client_id: view.client_id,
                    user_id: client.user_id,
                    angle_title: angle.title.clone(),
                    typology_name: view.typology.as_ref().map(|t| t.typology_name.clone()),
                    content: view.draft.clone(),
                },
                Uuid::new_v4(),
            )
            .await?
        };

        self.with_session(session_id, |session| {
            session.draft.clear();
            session.editing_script_id = None;
            session.state = FlowState::Saved;
            Ok(())
        })?;
        info!(session_id = %session_id, script_id = %script.id, "Saved script from flow");
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use db::models::client::CreateClient;
    use db::models::immersion::{
        AvatarProfile, MarketingInsights, OfferAnalysis, Recommendations,
    };
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

    fn test_service(pool: SqlitePool) -> ContentFlowService {
        // The key is never exercised: these tests stop at guard checks or
        // persistence paths that involve no generation call.
        let gemini = GeminiApiClient::new("test-key".to_string(), None).unwrap();
        ContentFlowService::new(pool, ScriptGenerator::new(gemini))
    }

    async fn seed_client(pool: &SqlitePool) -> Client {
        Client::create(
            pool,
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
        .unwrap()
    }

    fn report_with_typologies(names: &[&str]) -> ImmersionData {
        ImmersionData {
            avatar_profile: AvatarProfile {
                demographics: "d".to_string(),
                psychographics: "p".to_string(),
                pain_points: vec![],
                desires: vec![],
                fears: vec![],
                objections: vec![],
            },
            user_typologies: names
                .iter()
                .map(|name| UserTypology {
                    typology_name: name.to_string(),
                    mindset: "m".to_string(),
                    core_pain: "p".to_string(),
                    core_desire: "d".to_string(),
                    buying_trigger: "t".to_string(),
                    best_content_angle: "a".to_string(),
                    cta_style: "c".to_string(),
                })
                .collect(),
            offer_analysis: OfferAnalysis {
                core_value: "v".to_string(),
                emotional_triggers: vec![],
                logical_benefits: vec![],
                unique_selling_points: vec![],
                guarantee_strength: "g".to_string(),
                promotion_impact: "i".to_string(),
            },
            marketing_insights: MarketingInsights {
                buying_motivation: "b".to_string(),
                decision_factors: vec![],
                messaging_angle: "m".to_string(),
                call_to_action: "c".to_string(),
                competitive_advantage: "a".to_string(),
            },
            recommendations: Recommendations {
                content_strategy: "c".to_string(),
                channel_strategy: "h".to_string(),
                timing_strategy: "t".to_string(),
                follow_up_strategy: "f".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn start_state_depends_on_stored_report() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;

        let fresh = service.start(client.id).await.unwrap();
        assert_eq!(fresh.state, FlowState::NoImmersion);

        Client::set_immersion(&pool, client.id, Some(&report_with_typologies(&["T0"])))
            .await
            .unwrap();
        let ready = service.start(client.id).await.unwrap();
        assert_eq!(ready.state, FlowState::ImmersionReady);
    }

    #[tokio::test]
    async fn angle_selection_requires_a_typology_first() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        let session = service.start(client.id).await.unwrap();

        let err = service.select_angle(session.session_id, "Curiosity").unwrap_err();
        assert!(matches!(err, FlowError::TypologyRequired));
    }

    #[tokio::test]
    async fn generation_without_an_angle_fails_before_any_call() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        let session = service.start(client.id).await.unwrap();

        let err = service
            .generate(session.session_id, ScriptKind::Content)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::AngleRequired));
    }

    #[tokio::test]
    async fn typology_then_angle_walks_the_states() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        Client::set_immersion(&pool, client.id, Some(&report_with_typologies(&["T0", "T1"])))
            .await
            .unwrap();

        let session = service.start(client.id).await.unwrap();
        let after_typology = service
            .select_typology(session.session_id, "T1")
            .await
            .unwrap();
        assert_eq!(after_typology.state, FlowState::TypologySelected);
        assert_eq!(after_typology.typology_name.as_deref(), Some("T1"));

        let after_angle = service
            .select_angle(session.session_id, "Storytelling")
            .unwrap();
        assert_eq!(after_angle.state, FlowState::AngleSelected);
        assert_eq!(after_angle.angle_title.as_deref(), Some("Storytelling"));

        let err = service
            .select_typology(session.session_id, "T9")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownTypology(_)));
    }

    #[tokio::test]
    async fn unknown_angle_title_is_rejected() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        Client::set_immersion(&pool, client.id, Some(&report_with_typologies(&["T0"])))
            .await
            .unwrap();
        let session = service.start(client.id).await.unwrap();
        service
            .select_typology(session.session_id, "T0")
            .await
            .unwrap();

        let err = service
            .select_angle(session.session_id, "Not An Angle")
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownAngle(_)));
    }

    #[tokio::test]
    async fn save_with_empty_draft_is_rejected() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        let session = service.start(client.id).await.unwrap();

        let err = service.save(session.session_id).await.unwrap_err();
        assert!(matches!(err, FlowError::EmptyDraft));
    }

    #[tokio::test]
    async fn edit_then_save_updates_the_script_in_place() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        let script = Script::create(
            &pool,
            &CreateScript {
                client_id: client.id,
                user_id: client.user_id,
                angle_title: "Curiosity".to_string(),
                typology_name: None,
                content: "original".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let session = service.start(client.id).await.unwrap();
        let opened = service
            .edit_script(session.session_id, script.id)
            .await
            .unwrap();
        assert_eq!(opened.state, FlowState::ScriptGenerated);
        assert_eq!(opened.draft, "original");

        service
            .update_draft(session.session_id, "edited body")
            .unwrap();
        let saved = service.save(session.session_id).await.unwrap();
        assert_eq!(saved.id, script.id);
        assert_eq!(saved.content, "edited body");

        let after = service.snapshot(session.session_id).unwrap();
        assert_eq!(after.state, FlowState::Saved);
        assert!(after.draft.is_empty());
        assert!(after.editing_script_id.is_none());
    }

    #[tokio::test]
    async fn draft_edits_require_an_open_script() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        let session = service.start(client.id).await.unwrap();

        let err = service
            .update_draft(session.session_id, "text")
            .unwrap_err();
        assert!(matches!(err, FlowError::NoOpenScript));
    }

    #[tokio::test]
    async fn deleting_immersion_resets_the_session() {
        let pool = test_pool().await;
        let service = test_service(pool.clone());
        let client = seed_client(&pool).await;
        Client::set_immersion(&pool, client.id, Some(&report_with_typologies(&["T0"])))
            .await
            .unwrap();

        let session = service.start(client.id).await.unwrap();
        service
            .select_typology(session.session_id, "T0")
            .await
            .unwrap();
        service.delete_immersion(session.session_id).await.unwrap();

        let snapshot = service.snapshot(session.session_id).unwrap();
        assert_eq!(snapshot.state, FlowState::NoImmersion);
        assert!(snapshot.typology_name.is_none());

        let stored = Client::find_by_id(&pool, client.id).await.unwrap().unwrap();
        assert!(stored.immersion_data.is_none());
    }
}
