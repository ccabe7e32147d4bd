use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppPaths, Settings};
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::mail::MailStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: MailStore,
    pub llm: Arc<dyn LlmProvider>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub async fn initialize(paths: &AppPaths) -> anyhow::Result<Arc<Self>> {
        let settings = Settings::load(paths)?;
        let store = MailStore::new(paths).await?;
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
            settings.openai.base_url.clone(),
            settings.openai.resolved_api_key(),
        ));

        tracing::info!(
            provider = llm.name(),
            db = %store.db_path().display(),
            "application state ready"
        );

        Ok(Arc::new(AppState {
            settings,
            store,
            llm,
            started_at: Utc::now(),
        }))
    }
}
