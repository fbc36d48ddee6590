//! Generation service trait.
//!
//! The generation step is consumed by the pipeline, never by the retrieval
//! core itself. `ExtractiveGeneration` answers offline by quoting the best
//! retrieved passage.

use std::future::Future;

use recall_core::error::RecallError;
use recall_core::types::ScoredResult;

use crate::prompt::{CONTEXT_HEADER, QUESTION_HEADER};

const NO_ANSWER: &str = "I don't know based on the provided context.";

/// Service that turns a prompt into a completion.
pub trait GenerationService: Send + Sync {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, RecallError>> + Send;

    /// Complete a prompt built from `context`, ranked best first.
    ///
    /// Hosted models only need the prompt, so the default ignores `context`.
    fn complete_grounded<'a>(
        &'a self,
        prompt: &'a str,
        _context: &'a [ScoredResult<'a>],
    ) -> impl Future<Output = Result<String, RecallError>> + Send + 'a {
        async move { self.complete(prompt).await }
    }
}

/// Offline generator that quotes retrieved context instead of generating.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveGeneration;

impl ExtractiveGeneration {
    pub fn new() -> Self {
        Self
    }

    /// Everything between the context header and the trailing question.
    fn context_block(prompt: &str) -> Option<&str> {
        let start = prompt.find(CONTEXT_HEADER)? + CONTEXT_HEADER.len();
        let end = prompt
            .rfind(QUESTION_HEADER)
            .filter(|&end| end >= start)
            .unwrap_or(prompt.len());
        Some(prompt[start..end].trim()).filter(|block| !block.is_empty())
    }

    fn check_prompt(prompt: &str) -> Result<(), RecallError> {
        if prompt.trim().is_empty() {
            return Err(RecallError::Provider("Cannot complete empty prompt".to_string()));
        }
        Ok(())
    }
}

impl GenerationService for ExtractiveGeneration {
    async fn complete(&self, prompt: &str) -> Result<String, RecallError> {
        Self::check_prompt(prompt)?;
        Ok(Self::context_block(prompt)
            .unwrap_or(NO_ANSWER)
            .to_string())
    }

    fn complete_grounded<'a>(
        &'a self,
        prompt: &'a str,
        context: &'a [ScoredResult<'a>],
    ) -> impl Future<Output = Result<String, RecallError>> + Send + 'a {
        async move {
            Self::check_prompt(prompt)?;
            Ok(context
                .iter()
                .map(|hit| hit.text.trim())
                .find(|text| !text.is_empty())
                .unwrap_or(NO_ANSWER)
                .to_string())
        }
    }
}
