//! Turns retrieved email sections into the chat request sent to the model.

use crate::llm::{ChatMessage, ChatRequest};

/// System message framing every answer request.
pub const SYSTEM_PROMPT: &str =
    "To the best of your ability, use the context to answer the question.";

/// Join retrieved section texts into a single context block.
///
/// Sections arrive ranked best-first and are separated by blank lines.
/// No retrieved sections yields an empty context; the model is still
/// asked and has to answer from the question alone.
pub fn assemble_context(contents: &[String]) -> String {
    contents.join("\n\n")
}

/// Build the two-message request: the fixed system prompt plus a user
/// message carrying the labelled context block and the question.
pub fn build_question_request(context: &str, question: &str) -> ChatRequest {
    let user = format!("Context:\n{context}\n\nQuestion: {question}");
    ChatRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(&user),
    ])
}
