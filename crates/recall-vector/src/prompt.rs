//! Prompt assembly: instructions, retrieved context, then the question.

use recall_core::types::ScoredResult;

pub const CONTEXT_HEADER: &str = "### CONTEXT:";
pub const QUESTION_HEADER: &str = "### QUESTION:";

const INSTRUCTIONS: &str = "Answer the question based ONLY on the context below. \
If the context does not contain the answer, say that you don't know.";

/// Build a grounded prompt from ranked passages.
///
/// Passages appear in the order given, separated by blank lines.
pub fn build_prompt(context: &[ScoredResult<'_>], question: &str) -> String {
    let passages = context
        .iter()
        .map(|hit| hit.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{INSTRUCTIONS}\n\n{CONTEXT_HEADER}\n{passages}\n\n{QUESTION_HEADER}\n{}\n",
        question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let context = [
            ScoredResult {
                id: "0",
                text: "Mars has a currency called Red-Credits.",
                score: 0.8,
            },
            ScoredResult {
                id: "1",
                text: "  The mars colony was founded by Elon's clone.\n",
                score: 0.6,
            },
        ];
        let prompt = build_prompt(&context, " What is the currency on Mars? ");

        let context_at = prompt.find(CONTEXT_HEADER).unwrap();
        let question_at = prompt.find(QUESTION_HEADER).unwrap();
        assert!(prompt.starts_with("Answer the question based ONLY on the context below."));
        assert!(context_at < question_at);
        assert!(prompt.contains(
            "Mars has a currency called Red-Credits.\n\nThe mars colony was founded by Elon's clone."
        ));
        assert!(prompt.ends_with("### QUESTION:\nWhat is the currency on Mars?\n"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt(&[], "Hello?");
        assert!(prompt.contains("### CONTEXT:\n\n\n### QUESTION:\nHello?"));
    }
}
