//! Retrieval-augmented question answering over stored email.
//!
//! `chunker` and `context` hold the text manipulation; `ingest` and `ask`
//! are the two request pipelines built on top of them.

pub mod ask;
pub mod chunker;
pub mod context;
pub mod ingest;

pub use ask::answer_question;
pub use chunker::Chunker;
pub use ingest::{ingest_email, IngestOutcome};
