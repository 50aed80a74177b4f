// Resume analysis: PDF text extraction → zero-shot role classification → feedback generation.
// All model calls go through inference_client — no direct HTTP calls here.

pub mod classifier;
pub mod excerpt;
pub mod extractor;
pub mod feedback;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod roles;

use serde::Serialize;

pub use classifier::{RoleClassifier, ZeroShotClassifier};
pub use feedback::{FeedbackGenerator, Text2TextGenerator};

/// Truncation and generation bounds applied to every analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisLimits {
    /// Characters of extracted text echoed back as the preview.
    pub preview_chars: usize,
    /// Characters of extracted text fed to the classifier and the feedback prompt.
    pub excerpt_chars: usize,
    /// Upper bound on generated feedback, in tokens.
    pub max_feedback_tokens: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            preview_chars: 2000,
            excerpt_chars: 1000,
            max_feedback_tokens: 200,
        }
    }
}
