//! Builtin slash commands of the chat REPL.
//!
//! Each command maps 1:1 to a `ConversationManager` method. The table is
//! loaded once and cached for the lifetime of the application.

use std::sync::OnceLock;

/// A builtin slash command.
#[derive(Debug, Clone)]
pub struct BuiltinCommand {
    /// Command name (without the leading /)
    pub name: &'static str,
    /// Usage format (e.g., "/persona <key>")
    pub usage: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

impl BuiltinCommand {
    const fn new(name: &'static str, usage: &'static str, description: &'static str) -> Self {
        Self {
            name,
            usage,
            description,
        }
    }
}

/// Static storage for builtin commands (initialized once).
static BUILTIN_COMMANDS: OnceLock<Vec<BuiltinCommand>> = OnceLock::new();

/// Returns a reference to all builtin slash commands.
pub fn builtin_commands() -> &'static [BuiltinCommand] {
    BUILTIN_COMMANDS.get_or_init(|| {
        vec![
            BuiltinCommand::new("help", "/help", "Show this help message"),
            BuiltinCommand::new("list", "/list", "List available personas"),
            BuiltinCommand::new("persona", "/persona <key>", "Change the AI persona"),
            BuiltinCommand::new("clear", "/clear", "Clear conversation history"),
            BuiltinCommand::new("save", "/save [path]", "Save the conversation to a file"),
            BuiltinCommand::new("load", "/load <path>", "Load a conversation from a file"),
            BuiltinCommand::new("stats", "/stats", "Show conversation statistics"),
            BuiltinCommand::new("exit", "/exit", "Exit the chat"),
        ]
    })
}
