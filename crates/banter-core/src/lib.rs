//! Core conversation-state management for the banter chat client.
//!
//! This crate owns the ordered message log, the persona registry, the
//! history truncation policy, snapshot persistence, and the single network
//! call to the completion provider. Front ends (console REPL, web UI, batch
//! harness) are thin callers that live in their own crates.

pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod persona;
pub mod snapshot;

// Re-export the public API surface
pub use completion::{CompletionBackend, OpenAiClient};
pub use config::ApiConfig;
pub use conversation::{ConversationManager, ConversationStats, HISTORY_CAPACITY};
pub use error::{BanterError, Result};
pub use message::{Message, Role};
pub use persona::{Persona, PersonaRegistry};
pub use snapshot::{PersonaInfo, Snapshot};
