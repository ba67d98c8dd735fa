//! Completion provider interface.
//!
//! The conversation manager talks to exactly one provider through the
//! [`CompletionBackend`] trait; [`OpenAiClient`] is the production
//! implementation for OpenAI-compatible chat-completion endpoints.

mod openai;

pub use openai::{MAX_COMPLETION_TOKENS, OpenAiClient, SAMPLING_TEMPERATURE};

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A synchronous (one request, one response) completion provider.
///
/// The caller sends the entire conversation log every turn; there is no
/// incremental context caching. Implementations must not retry on failure;
/// a failed call is surfaced once to the caller.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Requests a completion for the given message log.
    ///
    /// # Errors
    ///
    /// Returns an `Api` error on network failure, non-2xx status, or an
    /// unusable payload (no choices, empty content).
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}
