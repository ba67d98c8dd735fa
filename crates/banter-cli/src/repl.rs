//! Interactive chat REPL.
//!
//! A rustyline loop over one `ConversationManager`. Slash commands map 1:1
//! to manager methods; anything else is sent to the completion provider as a
//! chat turn. Strictly sequential: one call completes before the next is
//! issued.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use banter_core::{ApiConfig, ConversationManager, OpenAiClient, PersonaRegistry};

use crate::commands::builtin_commands;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: builtin_commands()
                .iter()
                .map(|cmd| format!("/{}", cmd.name))
                .collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Runs the chat REPL until `/exit` or EOF.
pub async fn run(personas: Option<PathBuf>) -> Result<()> {
    let registry = match personas {
        Some(path) => PersonaRegistry::from_toml_file(&path)?,
        None => PersonaRegistry::load_default()?,
    };
    let config = ApiConfig::from_env()?;
    let backend = OpenAiClient::new(&config)?;
    let mut manager = ConversationManager::new(registry, Box::new(backend));

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Banter ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, or '/help' for available commands.".bright_black()
    );
    println!(
        "Current persona: {}",
        manager.active_persona().name.bright_cyan()
    );
    println!();

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let trimmed = line.trim();

                // Skip empty lines; the core would record them as turns.
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if let Some(command) = trimmed.strip_prefix('/') {
                    if !dispatch_command(&mut manager, command) {
                        break;
                    }
                } else {
                    match manager.chat(trimmed).await {
                        Ok(reply) => {
                            println!("{}", "Assistant:".bright_green());
                            for line in reply.lines() {
                                println!("{}", line.bright_blue());
                            }
                            println!();
                        }
                        Err(err) => {
                            eprintln!("{}", format!("Error getting response: {err}").red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Handles one slash command. Returns false when the REPL should exit.
fn dispatch_command(manager: &mut ConversationManager, input: &str) -> bool {
    let mut parts = input.split_whitespace();
    let name = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next();

    match name.as_str() {
        "help" => print_help(),
        "list" => {
            let current = manager.active_persona().key.clone();
            println!("\nAvailable personas:");
            for persona in manager.registry().personas() {
                let marker = if persona.key == current { ">" } else { " " };
                println!("  {} {} - {}", marker, persona.key, persona.name);
            }
            println!();
        }
        "persona" => match arg {
            Some(key) => match manager.set_persona(key) {
                Ok(confirmation) => println!("{}", confirmation.bright_green()),
                Err(err) => eprintln!("{}", err.to_string().red()),
            },
            None => eprintln!("{}", "Usage: /persona <key>".red()),
        },
        "clear" => {
            manager.clear_history();
            println!("{}", "Conversation history cleared.".bright_green());
        }
        "save" => match manager.save_snapshot(arg.map(Path::new)) {
            Ok(path) => println!(
                "{}",
                format!("Conversation saved to: {}", path.display()).bright_green()
            ),
            Err(err) => eprintln!("{}", format!("Error saving: {err}").red()),
        },
        "load" => match arg {
            Some(path) => match manager.load_snapshot(Path::new(path)) {
                Ok(()) => {
                    println!(
                        "{}",
                        format!("Conversation loaded from: {path}").bright_green()
                    );
                    println!("Current persona: {}", manager.active_persona().name);
                }
                Err(err) => eprintln!("{}", format!("Error loading: {err}").red()),
            },
            None => eprintln!("{}", "Usage: /load <path>".red()),
        },
        "stats" => {
            let stats = manager.stats();
            println!("\nConversation statistics:");
            println!("  Current persona: {}", stats.persona_name);
            println!("  Your messages: {}", stats.user_messages);
            println!("  AI responses: {}", stats.assistant_messages);
            println!("  Total messages: {}", stats.total_messages);
            println!();
        }
        "exit" => return false,
        unknown => {
            eprintln!(
                "{}",
                format!("Unknown command: /{unknown}. Type '/help' for available commands.").red()
            );
        }
    }

    true
}

fn print_help() {
    println!("\n{}", "Available commands:".bold());
    for cmd in builtin_commands() {
        println!("  {:<16} {}", cmd.usage, cmd.description);
    }
    println!();
}
