//! Query pipeline: embed the question, retrieve, assemble, ask the model.

use super::context::{assemble_context, build_question_request};
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::mail::MailStore;

/// Answer a question from stored email content.
///
/// Retrieval parameters (threshold, count, optional mailbox filter) come
/// from configuration. The assembled context is handed to the chat model
/// uncapped; its size is logged at debug level so runaway contexts are at
/// least visible.
pub async fn answer_question(
    store: &MailStore,
    llm: &dyn LlmProvider,
    settings: &Settings,
    question: &str,
) -> Result<String, ApiError> {
    let inputs = [question.to_string()];
    let question_embedding = llm
        .embed(&inputs, &settings.openai.embedding_model)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;

    let matches = store
        .match_sections(
            &question_embedding,
            settings.retrieval.match_threshold,
            settings.retrieval.match_count,
            settings.retrieval.mailbox_filter.as_deref(),
        )
        .await?;

    for m in &matches {
        tracing::debug!(
            email_id = m.email_id,
            section = m.section_order,
            similarity = m.similarity,
            "retrieval match"
        );
    }

    let contents: Vec<String> = matches.into_iter().map(|m| m.content).collect();
    let context = assemble_context(&contents);

    tracing::debug!(
        matches = contents.len(),
        context_chars = context.chars().count(),
        "assembled retrieval context"
    );

    let request = build_question_request(&context, question);
    let answer = llm.chat(request, &settings.openai.chat_model).await?;

    tracing::info!(answer_chars = answer.chars().count(), "answered question");

    Ok(answer)
}
