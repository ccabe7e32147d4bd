//! Ingestion pipeline: chunk the body, embed every chunk, persist.

use uuid::Uuid;

use super::chunker::Chunker;
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::mail::{EmailPayload, MailStore};

#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    pub email_id: i64,
    pub sections: usize,
}

/// Run the full ingestion pipeline for one validated email.
///
/// Chunks are embedded one call at a time, in section order, each awaited
/// before the next. Nothing is written until every embedding has arrived;
/// the email row and all section rows then land in one transaction, so a
/// failure anywhere leaves the store untouched.
pub async fn ingest_email(
    store: &MailStore,
    llm: &dyn LlmProvider,
    settings: &Settings,
    email: &EmailPayload,
) -> Result<IngestOutcome, ApiError> {
    let ingest_id = Uuid::new_v4();
    let chunks = Chunker::new(settings.chunking.max_chars).split(&email.body);

    tracing::debug!(%ingest_id, chunks = chunks.len(), "embedding email body");

    let mut sections: Vec<(String, Vec<f32>)> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let embedding = llm
            .embed(
                std::slice::from_ref(&chunk),
                &settings.openai.embedding_model,
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;
        sections.push((chunk, embedding));
    }

    let email_id = store.insert_email_with_sections(email, &sections).await?;

    tracing::info!(
        %ingest_id,
        email_id,
        sections = sections.len(),
        sender = %email.sender,
        "stored email"
    );

    Ok(IngestOutcome {
        email_id,
        sections: sections.len(),
    })
}
