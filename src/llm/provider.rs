use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs (e.g. "openai").
    fn name(&self) -> &str;

    /// Chat completion, non-streaming.
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;

    /// Generate embeddings, one vector per input, same order as the inputs.
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
