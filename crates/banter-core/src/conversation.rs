//! Conversation-state manager.
//!
//! [`ConversationManager`] owns the persona registry, the active persona,
//! the ordered message log, the truncation policy, the completion-call
//! wrapper, and snapshot persistence. Construct one per active conversation;
//! there is no process-global state.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::completion::CompletionBackend;
use crate::error::Result;
use crate::message::{Message, Role};
use crate::persona::{Persona, PersonaRegistry};
use crate::snapshot::Snapshot;

/// Maximum log length: the system message plus 20 turns.
pub const HISTORY_CAPACITY: usize = 21;

/// Role counts over the current (truncated) log.
///
/// `total_messages` excludes the system message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationStats {
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub total_messages: usize,
    pub persona_name: String,
}

/// Owns one conversation: persona, message log, and the provider call.
///
/// The log always starts with a system message carrying the active persona's
/// prompt. User and assistant entries are appended only by [`chat`]; the log
/// never exceeds [`HISTORY_CAPACITY`] entries, with the oldest non-system
/// entries evicted first.
///
/// [`chat`]: ConversationManager::chat
pub struct ConversationManager {
    registry: PersonaRegistry,
    backend: Box<dyn CompletionBackend>,
    active_key: String,
    log: Vec<Message>,
}

impl ConversationManager {
    /// Creates a manager on the registry's default persona with an empty
    /// history.
    pub fn new(registry: PersonaRegistry, backend: Box<dyn CompletionBackend>) -> Self {
        let active_key = registry.default_key().to_string();
        let log = vec![Message::system(&registry.default_persona().prompt)];
        Self {
            registry,
            backend,
            active_key,
            log,
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// The currently active persona.
    pub fn active_persona(&self) -> &Persona {
        // active_key is always a valid registry key.
        self.registry
            .get(&self.active_key)
            .expect("active persona key is always in the registry")
    }

    /// Switches the active persona and hard-resets the history.
    ///
    /// Previous turns are discarded; mixing personas mid-history is not
    /// supported. Returns a human-readable confirmation.
    ///
    /// # Errors
    ///
    /// Returns an `UnknownPersona` error (listing valid keys) for an unknown
    /// key, leaving the persona and log untouched.
    pub fn set_persona(&mut self, key: &str) -> Result<String> {
        let persona = self.registry.get(key)?;
        let confirmation = format!("Persona set to {} ({})", persona.name, persona.key);
        self.log = vec![Message::system(&persona.prompt)];
        self.active_key = persona.key.clone();
        Ok(confirmation)
    }

    /// Resets the log to the active persona's system message alone.
    pub fn clear_history(&mut self) {
        let prompt = self.active_persona().prompt.clone();
        self.log = vec![Message::system(prompt)];
    }

    /// Sends a user turn to the completion provider and records the reply.
    ///
    /// The entire current log, system message included, is resent every
    /// turn. Empty input is still appended as a user turn; caller UIs filter
    /// it out beforehand.
    ///
    /// # Errors
    ///
    /// On provider failure the already-appended user turn is NOT rolled
    /// back; the `Api` error propagates to the caller. No automatic retry.
    pub async fn chat(&mut self, text: &str) -> Result<String> {
        self.log.push(Message::user(text));

        let reply = self.backend.complete(&self.log).await?;

        self.log.push(Message::assistant(reply.clone()));
        self.truncate();
        Ok(reply)
    }

    /// Evicts the oldest non-system entries once the log exceeds
    /// [`HISTORY_CAPACITY`]. The system message is never evicted.
    fn truncate(&mut self) {
        if self.log.len() > HISTORY_CAPACITY {
            let excess = self.log.len() - HISTORY_CAPACITY;
            self.log.drain(1..1 + excess);
        }
    }

    /// A copy of the log. Mutating it cannot affect the manager's state.
    pub fn history(&self) -> Vec<Message> {
        self.log.clone()
    }

    /// Role counts computed by scanning the current log.
    pub fn stats(&self) -> ConversationStats {
        let user_messages = self
            .log
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        let assistant_messages = self
            .log
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count();

        ConversationStats {
            user_messages,
            assistant_messages,
            total_messages: self.log.len() - 1,
            persona_name: self.active_persona().name.clone(),
        }
    }

    /// Saves the conversation to `path`, or to a synthesized
    /// `conversation_<persona>_<timestamp>.json` when no path is given.
    ///
    /// Returns the path written. The log is never altered by a save.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be written.
    pub fn save_snapshot(&self, path: Option<&Path>) -> Result<PathBuf> {
        let snapshot = Snapshot::capture(self.active_persona(), &self.log);
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Snapshot::default_path(&self.active_key),
        };
        snapshot.write_to(&path)?;
        Ok(path)
    }

    /// Replaces the persona and log from a snapshot file.
    ///
    /// Load is all-or-nothing: on any error the prior in-memory state is
    /// left untouched. The snapshot's persona key is validated against the
    /// registry; unknown keys fall back to the default persona. A missing or
    /// non-system first entry gets a synthesized system message prepended,
    /// and on persona fallback an existing system head is rewritten to the
    /// resolved prompt, so the log head always matches the active persona.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the path is missing or unreadable, and a
    /// `Format` error if the content does not parse as a snapshot.
    pub fn load_snapshot(&mut self, path: &Path) -> Result<()> {
        let snapshot = Snapshot::read_from(path)?;

        let persona = match self.registry.get(&snapshot.persona) {
            Ok(persona) => persona,
            Err(_) => {
                tracing::warn!(
                    persona = %snapshot.persona,
                    "snapshot references an unknown persona, falling back to default"
                );
                self.registry.default_persona()
            }
        };
        let fell_back = persona.key != snapshot.persona;
        let key = persona.key.clone();
        let prompt = persona.prompt.clone();

        let mut log = snapshot.conversation;
        match log.first_mut() {
            Some(head) if head.role == Role::System => {
                if fell_back {
                    head.content = prompt;
                }
            }
            _ => log.insert(0, Message::system(prompt)),
        }

        self.active_key = key;
        self.log = log;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionBackend;
    use crate::error::BanterError;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::{Arc, Mutex};

    /// Backend that records every request and replies with a numbered
    /// canned response, or fails every call.
    struct ScriptedBackend {
        calls: Arc<Mutex<Vec<Vec<Message>>>>,
        fail_with: Option<BanterError>,
    }

    fn recording_backend() -> (Arc<Mutex<Vec<Vec<Message>>>>, Box<dyn CompletionBackend>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let backend = ScriptedBackend {
            calls: calls.clone(),
            fail_with: None,
        };
        (calls, Box::new(backend))
    }

    fn failing_backend(err: BanterError) -> Box<dyn CompletionBackend> {
        Box::new(ScriptedBackend {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(err),
        })
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, messages: &[Message]) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_vec());
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(format!("reply {}", calls.len()))
        }
    }

    fn new_manager() -> ConversationManager {
        let (_, backend) = recording_backend();
        ConversationManager::new(PersonaRegistry::with_presets(), backend)
    }

    #[test]
    fn new_manager_starts_on_default_persona() {
        let manager = new_manager();

        let history = manager.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(manager.active_persona().key, "professional");
    }

    #[test]
    fn set_persona_resets_log_to_single_system_message() {
        let mut manager = new_manager();

        for key in ["professional", "creative", "technical"] {
            let confirmation = manager.set_persona(key).unwrap();
            assert!(confirmation.contains(key));

            let history = manager.history();
            let expected = manager.registry().get(key).unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].role, Role::System);
            assert_eq!(history[0].content, expected.prompt);
        }
    }

    #[tokio::test]
    async fn set_persona_unknown_key_leaves_state_untouched() {
        let mut manager = new_manager();
        manager.chat("hello").await.unwrap();
        let before = manager.history();

        let err = manager.set_persona("pirate").unwrap_err();

        assert!(err.is_unknown_persona());
        assert_eq!(manager.active_persona().key, "professional");
        assert_eq!(manager.history(), before);
    }

    #[tokio::test]
    async fn clear_history_is_idempotent() {
        let mut manager = new_manager();
        manager.chat("hello").await.unwrap();

        manager.clear_history();
        let once = manager.history();
        manager.clear_history();
        let twice = manager.history();

        assert_eq!(once.len(), 1);
        assert_eq!(once[0].role, Role::System);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn chat_appends_user_and_assistant_turns() {
        let mut manager = new_manager();

        let reply = manager.chat("hello").await.unwrap();

        let history = manager.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], Message::user("hello"));
        assert_eq!(history[2], Message::assistant(&reply));
    }

    #[tokio::test]
    async fn chat_sends_entire_log_including_system_message() {
        let (calls, backend) = recording_backend();
        let mut manager = ConversationManager::new(PersonaRegistry::with_presets(), backend);

        manager.chat("first").await.unwrap();
        manager.chat("second").await.unwrap();

        let calls = calls.lock().unwrap();
        let last = calls.last().unwrap();
        assert_eq!(last[0].role, Role::System);
        assert_eq!(last[1], Message::user("first"));
        assert_eq!(last[2], Message::assistant("reply 1"));
        assert_eq!(last[3], Message::user("second"));
    }

    #[tokio::test]
    async fn empty_input_is_still_appended_as_user_turn() {
        let mut manager = new_manager();

        manager.chat("").await.unwrap();

        assert_eq!(manager.history()[1], Message::user(""));
    }

    #[tokio::test]
    async fn truncation_keeps_system_plus_last_twenty() {
        let mut manager = new_manager();

        for i in 1..=25 {
            manager.chat(&format!("question {i}")).await.unwrap();
        }

        let history = manager.history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0].role, Role::System);
        // The remaining 20 entries are the 10 most recent turns in order.
        assert_eq!(history[1], Message::user("question 16"));
        assert_eq!(history[2], Message::assistant("reply 16"));
        assert_eq!(history[19], Message::user("question 25"));
        assert_eq!(history[20], Message::assistant("reply 25"));
    }

    #[tokio::test]
    async fn failed_chat_keeps_orphaned_user_turn() {
        let mut manager = ConversationManager::new(
            PersonaRegistry::with_presets(),
            failing_backend(BanterError::api("boom")),
        );
        let total_before = manager.stats().total_messages;

        let err = manager.chat("hi").await.unwrap_err();

        assert!(err.is_api());
        let history = manager.history();
        assert_eq!(history.last().unwrap(), &Message::user("hi"));
        assert_eq!(manager.stats().total_messages, total_before + 1);
    }

    #[tokio::test]
    async fn stats_count_roles_over_current_log() {
        let mut manager = new_manager();

        for i in 0..3 {
            manager.chat(&format!("message {i}")).await.unwrap();
        }

        let stats = manager.stats();
        assert_eq!(stats.user_messages, 3);
        assert_eq!(stats.assistant_messages, 3);
        assert_eq!(stats.total_messages, 6);
        assert_eq!(stats.persona_name, "Professional Assistant");
    }

    #[tokio::test]
    async fn history_returns_defensive_copy() {
        let mut manager = new_manager();
        manager.chat("hello").await.unwrap();

        let mut copy = manager.history();
        copy.clear();

        assert_eq!(manager.history().len(), 3);
    }

    #[tokio::test]
    async fn snapshot_round_trip_reproduces_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut manager = new_manager();
        manager.set_persona("creative").unwrap();
        manager.chat("tell me a story").await.unwrap();
        let saved_history = manager.history();

        let written = manager.save_snapshot(Some(&path)).unwrap();
        assert_eq!(written, path);
        // Saving never alters the log.
        assert_eq!(manager.history(), saved_history);

        let mut fresh = new_manager();
        fresh.load_snapshot(&path).unwrap();

        assert_eq!(fresh.active_persona().key, "creative");
        assert_eq!(fresh.history(), saved_history);
    }

    #[test]
    fn save_to_unwritable_path_is_io_error() {
        let manager = new_manager();

        let err = manager
            .save_snapshot(Some(Path::new("/nonexistent/dir/snapshot.json")))
            .unwrap_err();

        assert!(err.is_io());
    }

    #[tokio::test]
    async fn failed_load_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        fs::write(&path, "not a snapshot").unwrap();

        let mut manager = new_manager();
        manager.chat("hello").await.unwrap();
        let before = manager.history();

        let err = manager.load_snapshot(&path).unwrap_err();

        assert!(err.is_format());
        assert_eq!(manager.history(), before);
        assert_eq!(manager.active_persona().key, "professional");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let mut manager = new_manager();

        let err = manager
            .load_snapshot(Path::new("/nonexistent/snapshot.json"))
            .unwrap_err();

        assert!(err.is_io());
    }

    #[test]
    fn load_synthesizes_missing_system_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headless.json");
        fs::write(
            &path,
            r#"{
                "timestamp": "2025-06-01T12:00:00+00:00",
                "persona": "technical",
                "persona_info": { "name": "Technical Expert", "prompt": "old prompt" },
                "conversation": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "hello" }
                ]
            }"#,
        )
        .unwrap();

        let mut manager = new_manager();
        manager.load_snapshot(&path).unwrap();

        let history = manager.history();
        let expected_prompt = &manager.registry().get("technical").unwrap().prompt;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(&history[0].content, expected_prompt);
        assert_eq!(history[1], Message::user("hi"));
    }

    #[test]
    fn load_unknown_persona_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unknown.json");
        fs::write(
            &path,
            r#"{
                "timestamp": "2025-06-01T12:00:00+00:00",
                "persona": "pirate",
                "persona_info": { "name": "Pirate", "prompt": "arr" },
                "conversation": [
                    { "role": "system", "content": "arr" },
                    { "role": "user", "content": "ahoy" }
                ]
            }"#,
        )
        .unwrap();

        let mut manager = new_manager();
        manager.load_snapshot(&path).unwrap();

        assert_eq!(manager.active_persona().key, "professional");
        let history = manager.history();
        // The stale system head is rewritten to the resolved persona's prompt.
        assert_eq!(history[0].content, manager.active_persona().prompt);
        assert_eq!(history[1], Message::user("ahoy"));
    }
}
