//! Conversation snapshot persistence.
//!
//! A snapshot is a fully self-describing copy of persona + message log at a
//! point in time. The JSON shape is user-facing persisted state and must not
//! drift:
//!
//! ```text
//! {
//!   "timestamp": "<ISO-8601>",
//!   "persona": "<registry key>",
//!   "persona_info": { "name": "...", "prompt": "..." },
//!   "conversation": [ { "role": "...", "content": "..." }, ... ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::persona::Persona;

/// Persona details embedded in a snapshot so the file stands on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaInfo {
    pub name: String,
    pub prompt: String,
}

impl From<&Persona> for PersonaInfo {
    fn from(persona: &Persona) -> Self {
        Self {
            name: persona.name.clone(),
            prompt: persona.prompt.clone(),
        }
    }
}

/// Persisted form of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub persona: String,
    pub persona_info: PersonaInfo,
    pub conversation: Vec<Message>,
}

impl Snapshot {
    /// Captures the given persona and log with the current timestamp.
    pub fn capture(persona: &Persona, conversation: &[Message]) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            persona: persona.key.clone(),
            persona_info: PersonaInfo::from(persona),
            conversation: conversation.to_vec(),
        }
    }

    /// Synthesizes a file name from the persona key and the current local
    /// time. Collisions across same-second calls are accepted.
    pub fn default_path(persona_key: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("conversation_{persona_key}_{stamp}.json"))
    }

    /// Writes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reads a snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the path does not exist or cannot be read,
    /// and a `Format` error if the content is not parseable as a snapshot.
    pub fn read_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}
