pub mod compose;
pub mod fallback;

pub use compose::compose;
pub use fallback::FallbackMessage;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::Generator;
use crate::pr::PullRequestContext;

/// Produces the greeting for a pull request: generated text when the model
/// answers, the fallback message otherwise. Never fails.
#[derive(Clone)]
pub struct CommentGenerator {
    generator: Arc<dyn Generator>,
    fallback: Arc<FallbackMessage>,
}

impl CommentGenerator {
    pub fn new(generator: Arc<dyn Generator>, fallback: Arc<FallbackMessage>) -> Self {
        Self { generator, fallback }
    }

    pub async fn get_comment(&self, ctx: &PullRequestContext) -> String {
        let prompt = compose(ctx);
        match self.generator.generate(&prompt.system, &prompt.user).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(repo = %ctx.full_name, pr = ctx.number, "using generated comment");
                text.trim().to_string()
            }
            Ok(_) => {
                warn!(repo = %ctx.full_name, pr = ctx.number, "generation returned empty text, posting fallback message");
                self.fallback.as_str().to_string()
            }
            Err(e) => {
                warn!(repo = %ctx.full_name, pr = ctx.number, error = %e, "generation failed, posting fallback message");
                self.fallback.as_str().to_string()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::handler::tests::test_context;
    use crate::llm::GenerationError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub(crate) const FALLBACK_TEXT: &str = "Thanks for opening this pull request! A maintainer will take a look soon.\n";

    /// Generator returning a canned answer and recording the prompts it saw.
    pub(crate) struct StubGenerator {
        pub answer: Result<String, ()>,
        pub prompts: Mutex<Vec<(String, String)>>,
    }

    impl StubGenerator {
        pub fn ok(text: &str) -> Self {
            Self { answer: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) }
        }

        pub fn failing() -> Self {
            Self { answer: Err(()), prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push((system.to_string(), user.to_string()));
            match &self.answer {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GenerationError::Api { status: 503, body: "unavailable".to_string() }),
            }
        }
    }

    pub(crate) fn test_fallback() -> Arc<FallbackMessage> {
        Arc::new(FallbackMessage::new(FALLBACK_TEXT).unwrap())
    }

    #[tokio::test]
    async fn test_success_returns_trimmed_text() {
        let generator = Arc::new(StubGenerator::ok("\n  Hello @alice!\nEstimated resolution time: 15 minutes  \n"));
        let comments = CommentGenerator::new(generator.clone(), test_fallback());

        let text = comments.get_comment(&test_context()).await;
        assert_eq!(text, "Hello @alice!\nEstimated resolution time: 15 minutes");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].1.contains("Title: Fix bug"));
    }

    #[tokio::test]
    async fn test_failure_returns_fallback_verbatim() {
        let comments = CommentGenerator::new(Arc::new(StubGenerator::failing()), test_fallback());
        assert_eq!(comments.get_comment(&test_context()).await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_whitespace_answer_returns_fallback() {
        let comments = CommentGenerator::new(Arc::new(StubGenerator::ok(" \n\t ")), test_fallback());
        assert_eq!(comments.get_comment(&test_context()).await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_generation_is_attempted_once() {
        let generator = Arc::new(StubGenerator::failing());
        let comments = CommentGenerator::new(generator.clone(), test_fallback());
        comments.get_comment(&test_context()).await;
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }
}
