//! Feedback Generator — resume improvement suggestions from a text-to-text model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::excerpt::bound_tokens;
use crate::analysis::prompts::FEEDBACK_PROMPT_TEMPLATE;
use crate::analysis::roles::JobRole;
use crate::inference_client::{InferenceClient, InferenceError};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("model returned no generated text")]
    EmptyGeneration,
}

/// Fills the feedback template with the predicted role and a resume excerpt.
pub fn build_feedback_prompt(role: JobRole, resume_excerpt: &str) -> String {
    FEEDBACK_PROMPT_TEMPLATE
        .replace("{role}", role.label())
        .replace("{resume_excerpt}", resume_excerpt)
}

/// Carried in `AppState` as `Arc<dyn FeedbackGenerator>`.
///
/// Implementations must return at most `max_tokens` tokens.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GeneratorError>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Hosted seq2seq model (flan-t5 by default).
pub struct Text2TextGenerator {
    client: InferenceClient,
    model: String,
}

impl Text2TextGenerator {
    pub fn new(client: InferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl FeedbackGenerator for Text2TextGenerator {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GeneratorError> {
        let request = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: max_tokens,
            },
        };

        let outputs: Vec<GeneratedText> = self.client.call(&self.model, &request).await?;
        first_generation(outputs, max_tokens)
    }
}

/// The model token budget is enforced server-side; the whitespace bound here
/// keeps the contract even when the endpoint ignores `max_new_tokens`.
fn first_generation(
    outputs: Vec<GeneratedText>,
    max_tokens: usize,
) -> Result<String, GeneratorError> {
    outputs
        .into_iter()
        .next()
        .map(|o| bound_tokens(&o.generated_text, max_tokens))
        .filter(|text| !text.is_empty())
        .ok_or(GeneratorError::EmptyGeneration)
}
