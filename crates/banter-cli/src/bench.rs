//! Persona comparison harness.
//!
//! Sends the same fixed question set to every persona in the registry and
//! records the responses side by side. History is cleared between questions
//! so answers never bleed context into each other. Results are written as
//! JSON, optionally with a Markdown comparison report.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use colored::Colorize;
use serde::Serialize;

use banter_core::{ApiConfig, ConversationManager, OpenAiClient, PersonaInfo, PersonaRegistry};

/// Questions covering different domains, so tone differences show.
const QUESTIONS: [&str; 5] = [
    "How do I start a business?",
    "Write a short story about a robot discovering emotions",
    "Explain how machine learning works",
    "What's the best way to manage a team?",
    "How do I solve creative blocks?",
];

#[derive(Serialize)]
struct BenchResults {
    test_date: String,
    questions: Vec<String>,
    results: Vec<PersonaResult>,
}

#[derive(Serialize)]
struct PersonaResult {
    persona: String,
    persona_info: PersonaInfo,
    answers: Vec<Answer>,
}

#[derive(Serialize)]
struct Answer {
    question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Runs the harness and writes the result files.
pub async fn run(personas: Option<PathBuf>, output: Option<PathBuf>, report: bool) -> Result<()> {
    let registry = match personas {
        Some(path) => PersonaRegistry::from_toml_file(&path)?,
        None => PersonaRegistry::load_default()?,
    };
    let config = ApiConfig::from_env()?;
    let backend = OpenAiClient::new(&config)?;
    let mut manager = ConversationManager::new(registry, Box::new(backend));

    let keys: Vec<String> = manager.registry().keys().map(str::to_string).collect();

    println!("{}", "=== Persona comparison ===".bright_magenta().bold());
    println!(
        "Testing {} personas with {} questions",
        keys.len(),
        QUESTIONS.len()
    );

    let mut results = BenchResults {
        test_date: Utc::now().to_rfc3339(),
        questions: QUESTIONS.iter().map(|q| q.to_string()).collect(),
        results: Vec::new(),
    };

    for key in &keys {
        manager.set_persona(key)?;
        let persona_info = PersonaInfo::from(manager.active_persona());
        println!(
            "\nTesting {} persona...",
            manager.active_persona().name.bright_cyan()
        );

        let mut answers = Vec::new();
        for (i, question) in QUESTIONS.iter().enumerate() {
            println!("  Question {}/{}: {}", i + 1, QUESTIONS.len(), question);

            // Fresh history per question; no context bleeding between answers.
            manager.clear_history();
            let answer = match manager.chat(question).await {
                Ok(response) => {
                    println!(
                        "{}",
                        format!("    Response received ({} chars)", response.len()).bright_black()
                    );
                    Answer {
                        question: question.to_string(),
                        response: Some(response),
                        error: None,
                    }
                }
                Err(err) => {
                    eprintln!("{}", format!("    Error: {err}").red());
                    Answer {
                        question: question.to_string(),
                        response: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            answers.push(answer);
        }

        results.results.push(PersonaResult {
            persona: key.clone(),
            persona_info,
            answers,
        });
    }

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let output = output.unwrap_or_else(|| PathBuf::from(format!("persona_bench_{stamp}.json")));
    let json = serde_json::to_string_pretty(&results)?;
    fs::write(&output, json).with_context(|| format!("failed to write {}", output.display()))?;
    println!("\nResults saved to: {}", output.display());

    if report {
        let report_path = PathBuf::from(format!("persona_comparison_{stamp}.md"));
        fs::write(&report_path, render_report(&results))
            .with_context(|| format!("failed to write {}", report_path.display()))?;
        println!("Comparison report generated: {}", report_path.display());
    }

    Ok(())
}

/// Renders the results as a Markdown comparison report.
fn render_report(results: &BenchResults) -> String {
    let mut out = String::new();
    out.push_str("# Persona Comparison Report\n\n");
    out.push_str(&format!("**Test date:** {}\n\n", results.test_date));

    out.push_str("## Personas tested\n\n");
    for persona in &results.results {
        out.push_str(&format!("### {}\n", persona.persona_info.name));
        out.push_str(&format!(
            "**System prompt:** {}\n\n",
            persona.persona_info.prompt
        ));
    }

    out.push_str("## Question-by-question\n\n");
    for (i, question) in results.questions.iter().enumerate() {
        out.push_str(&format!("### Question {}: {}\n\n", i + 1, question));
        for persona in &results.results {
            if let Some(answer) = persona.answers.iter().find(|a| &a.question == question) {
                out.push_str(&format!("**{}:**\n", persona.persona_info.name));
                match (&answer.response, &answer.error) {
                    (Some(response), _) => out.push_str(&format!("{response}\n\n")),
                    (None, Some(error)) => out.push_str(&format!("*Error: {error}*\n\n")),
                    (None, None) => out.push_str("*No answer recorded*\n\n"),
                }
            }
        }
        out.push_str("---\n\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> BenchResults {
        BenchResults {
            test_date: "2025-06-01T12:00:00+00:00".to_string(),
            questions: vec!["What is Rust?".to_string()],
            results: vec![PersonaResult {
                persona: "technical".to_string(),
                persona_info: PersonaInfo {
                    name: "Technical Expert".to_string(),
                    prompt: "Be precise.".to_string(),
                },
                answers: vec![Answer {
                    question: "What is Rust?".to_string(),
                    response: Some("A systems language.".to_string()),
                    error: None,
                }],
            }],
        }
    }

    #[test]
    fn report_includes_personas_and_answers() {
        let report = render_report(&sample_results());

        assert!(report.contains("# Persona Comparison Report"));
        assert!(report.contains("### Technical Expert"));
        assert!(report.contains("Question 1: What is Rust?"));
        assert!(report.contains("A systems language."));
    }

    #[test]
    fn failed_answers_serialize_as_error() {
        let answer = Answer {
            question: "q".to_string(),
            response: None,
            error: Some("Completion API error: boom".to_string()),
        };

        let value = serde_json::to_value(&answer).unwrap();
        assert!(value.get("response").is_none());
        assert_eq!(value["error"], "Completion API error: boom");
    }
}
