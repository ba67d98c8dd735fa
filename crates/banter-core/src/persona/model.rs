//! Persona domain model.

use serde::{Deserialize, Serialize};

/// A named system-prompt configuration.
///
/// Each persona shapes the assistant's tone and behavior for every turn sent
/// while it is active. Personas are static configuration: loaded once at
/// startup and immutable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Registry key used to select the persona (e.g. `"technical"`)
    pub key: String,
    /// Display name shown to the user
    pub name: String,
    /// System prompt installed as the first log entry
    pub prompt: String,
}
