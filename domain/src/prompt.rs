//! Prompt templates for the three council stages

use crate::council::aggregate::AggregateEntry;
use crate::council::anonymizer::Label;

/// Templates for generating prompts at each stage
pub struct CouncilPrompt;

impl CouncilPrompt {
    /// Stage 2 user prompt: rank the anonymized answers.
    ///
    /// Reviewers see only opaque labels; they are not told which answer
    /// is their own. The closing instructions steer models toward the
    /// numbered-list format the rank parser prefers, but parsing stays
    /// lenient regardless.
    pub fn ranking_prompt(question: &str, anonymized: &[(Label, &str)]) -> String {
        let mut prompt = format!(
            r#"You were asked the following question:

{}

Several anonymous responses to this question are shown below. Evaluate each one for accuracy, depth, and clarity, then rank them from best to worst.

"#,
            question
        );

        for (label, answer) in anonymized {
            prompt.push_str(&format!("--- {} ---\n{}\n\n", label, answer));
        }

        prompt.push_str(
            r#"First give a brief assessment of each response. Then end with your final ranking as a numbered list from best to worst, one label per line, like:

FINAL RANKING:
1. Response X
2. Response Y"#,
        );

        prompt
    }

    /// Stage 3 user prompt: chairman synthesis.
    ///
    /// `answers` pairs each model's display name with its Stage 1 answer
    /// (already de-anonymized). Works with an empty leaderboard: when no
    /// critique parsed, the chairman synthesizes from the answers alone.
    pub fn synthesis_prompt(
        question: &str,
        answers: &[(String, &str)],
        leaderboard: &[AggregateEntry],
    ) -> String {
        let mut prompt = format!(
            r#"You are the chairman of an LLM council. Council members each answered the user's question independently and then ranked each other's answers anonymously.

Original question:

{}

Council answers:
"#,
            question
        );

        for (model, answer) in answers {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", model, answer));
        }

        if !leaderboard.is_empty() {
            prompt.push_str("\nPeer ranking leaderboard (lower average rank is better):\n");
            for entry in leaderboard {
                prompt.push_str(&format!(
                    "- {}: average rank {:.2} over {} votes\n",
                    entry.model.short_name(),
                    entry.average_rank,
                    entry.rankings_count
                ));
            }
        }

        prompt.push_str(
            r#"
Synthesize the strongest elements of these answers into a single final response for the user. Give extra weight to answers the council ranked highly, resolve disagreements with your own judgment, and do not mention the council process in your reply."#,
        );

        prompt
    }

    /// Prompt for generating a short conversation title
    pub fn title_prompt(question: &str) -> String {
        format!(
            r#"Generate a very short title (at most 6 words) summarizing this question. Reply with the title only, no quotes or punctuation around it.

Question: {}"#,
            question
        )
    }
}
