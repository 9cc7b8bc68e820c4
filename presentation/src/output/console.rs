//! Console output formatter for council results

use colored::Colorize;
use council_application::config::CouncilConfig;
use council_application::use_cases::run_turn::TurnOutcome;
use council_domain::{ConversationSummary, CouncilEvent};

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete turn outcome
    pub fn format(question: &str, outcome: &TurnOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Question:".cyan().bold(), question));

        // Stage 1: Individual Answers
        output.push_str(&Self::section_header("Stage 1: Individual Answers"));
        for answer in &outcome.stage1 {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", answer.model.short_name()).yellow().bold(),
                answer.text()
            ));
        }

        // Stage 2: Peer Rankings, de-anonymized for display
        output.push_str(&Self::section_header("Stage 2: Peer Rankings"));
        for critique in &outcome.stage2 {
            let text = critique.ranking.as_deref().unwrap_or("");
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── ranked by {} ──", critique.model.short_name())
                    .yellow()
                    .bold(),
                outcome.label_to_model.deanonymize(text)
            ));
        }

        if !outcome.aggregate.is_empty() {
            output.push_str(&format!("\n{}\n", "Leaderboard:".cyan().bold()));
            for (i, entry) in outcome.aggregate.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {} (average rank {:.2}, {} votes)\n",
                    i + 1,
                    entry.model.short_name(),
                    entry.average_rank,
                    entry.rankings_count
                ));
            }
        }

        // Stage 3: Final Answer
        output.push_str(&Self::section_header("Stage 3: Final Answer"));
        output.push_str(&format!("\n{}\n", outcome.final_answer));

        output
    }

    /// Format only the final answer (concise output)
    pub fn format_final_only(question: &str, outcome: &TurnOutcome) -> String {
        format!(
            "{}\n\n{} {}\n\n{}\n",
            "=== LLM Council Answer ===".cyan().bold(),
            "Q:".bold(),
            question,
            outcome.final_answer
        )
    }

    /// One-line progress rendering for a streamed event.
    ///
    /// Returns `None` for events that carry no new line of their own
    /// (the full payloads are rendered from the final outcome).
    pub fn event_line(event: &CouncilEvent) -> Option<String> {
        match event {
            CouncilEvent::Stage1Start { models } => Some(format!(
                "{} asking {} models...",
                "Stage 1:".cyan().bold(),
                models.len()
            )),
            CouncilEvent::Stage1Response { data } => Some(if data.is_success() {
                format!("  {} {} answered", "✓".green(), data.model.short_name())
            } else {
                format!("  {} {} failed", "✗".red(), data.model.short_name())
            }),
            CouncilEvent::Stage2Start { models, .. } => Some(format!(
                "{} collecting rankings from {} models...",
                "Stage 2:".cyan().bold(),
                models.len()
            )),
            CouncilEvent::Stage2Response { data } => Some(if data.is_success() {
                format!("  {} {} ranked", "✓".green(), data.model.short_name())
            } else {
                format!("  {} {} failed", "✗".red(), data.model.short_name())
            }),
            CouncilEvent::Stage3Start => {
                Some(format!("{} synthesizing...", "Stage 3:".cyan().bold()))
            }
            CouncilEvent::TitleComplete { data } => {
                Some(format!("{} {}", "Title:".dimmed(), data.title))
            }
            CouncilEvent::Error { message } => {
                Some(format!("{} {}", "Error:".red().bold(), message))
            }
            _ => None,
        }
    }

    /// Format the conversation list
    pub fn format_summaries(summaries: &[ConversationSummary]) -> String {
        if summaries.is_empty() {
            return "No conversations yet.\n".to_string();
        }

        let mut output = String::new();
        for summary in summaries {
            output.push_str(&format!(
                "{}  {}  {} ({} messages)\n",
                summary.id.as_str().dimmed(),
                summary.created_at.format("%Y-%m-%d %H:%M"),
                summary.title.bold(),
                summary.message_count
            ));
        }
        output
    }

    /// Format the current configuration
    pub fn format_config(config: &CouncilConfig) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Council members:".cyan().bold()));
        for model in &config.council {
            let marker = if *model == config.chairman {
                " (chairman)".yellow().to_string()
            } else {
                String::new()
            };
            output.push_str(&format!("  - {}{}\n", model, marker));
        }
        if let Some(effort) = &config.default_reasoning_effort {
            output.push_str(&format!(
                "{} {}\n",
                "Default reasoning effort:".cyan().bold(),
                effort
            ));
        }
        output.push_str(&format!(
            "{} {}s\n",
            "Request timeout:".cyan().bold(),
            config.request_timeout_secs
        ));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        AggregateEntry, LabelMap, Model, Stage1Answer, Stage2Critique, TurnId,
    };

    fn outcome() -> TurnOutcome {
        let stage1 = vec![
            Stage1Answer::success("openai/gpt-5.2", "Rust is fast."),
            Stage1Answer::success("anthropic/claude-opus-4.5", "Rust is safe."),
        ];
        let label_map = LabelMap::assign(&stage1);
        TurnOutcome {
            turn: TurnId::next(),
            stage1,
            stage2: vec![Stage2Critique::success(
                "openai/gpt-5.2",
                "Response B was clearer.",
                vec![],
            )],
            label_to_model: label_map,
            aggregate: vec![AggregateEntry {
                model: Model::new("anthropic/claude-opus-4.5"),
                average_rank: 1.0,
                rankings_count: 2,
            }],
            final_answer: "Rust is fast and safe.".to_string(),
            title: None,
        }
    }

    #[test]
    fn test_format_deanonymizes_critiques() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format("What is Rust?", &outcome());
        assert!(text.contains("What is Rust?"));
        assert!(text.contains("claude-opus-4.5 was clearer."));
        assert!(!text.contains("Response B"));
        assert!(text.contains("Rust is fast and safe."));
    }

    #[test]
    fn test_format_includes_leaderboard() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format("q", &outcome());
        assert!(text.contains("average rank 1.00, 2 votes"));
    }

    #[test]
    fn test_event_lines() {
        colored::control::set_override(false);
        let line = ConsoleFormatter::event_line(&CouncilEvent::Stage1Response {
            data: Stage1Answer::failure("openai/gpt-5.2"),
        })
        .unwrap();
        assert!(line.contains("gpt-5.2 failed"));

        assert!(ConsoleFormatter::event_line(&CouncilEvent::Complete).is_none());
    }

    #[test]
    fn test_empty_summary_list() {
        let text = ConsoleFormatter::format_summaries(&[]);
        assert!(text.contains("No conversations"));
    }
}
