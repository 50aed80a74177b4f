//! Resume Analysis — orchestrates one uploaded resume through the pipeline.
//!
//! Flow: upload check → extract_text → preview → classify(excerpt) →
//!       build_feedback_prompt → generate → ResumeAnalysis.
//!
//! Each stage failure is terminal for the request and is carried as a typed
//! `AnalysisError`; nothing is retried here (the inference client retries
//! transport-level failures on its own).

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::classifier::{RoleClassifier, RoleRanking};
use crate::analysis::excerpt::truncate_chars;
use crate::analysis::extractor::extract_text;
use crate::analysis::feedback::{build_feedback_prompt, FeedbackGenerator};
use crate::analysis::prompts::UPLOAD_PROMPT;
use crate::analysis::roles::JobRole;
use crate::analysis::AnalysisLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Upload,
    Extraction,
    Classification,
    Generation,
}

/// Why an analysis stopped early. The `Display` text is what the user sees in
/// the field the failing stage would have filled; every variant except the
/// upload prompt starts with "Error".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("{}", UPLOAD_PROMPT)]
    MissingUpload,

    #[error("Error extracting text: {0}")]
    Extraction(String),

    #[error("Error classifying role: {0}")]
    Classification(String),

    #[error("Error generating feedback: {0}")]
    Generation(String),
}

impl AnalysisError {
    pub fn stage(&self) -> AnalysisStage {
        match self {
            AnalysisError::MissingUpload => AnalysisStage::Upload,
            AnalysisError::Extraction(_) => AnalysisStage::Extraction,
            AnalysisError::Classification(_) => AnalysisStage::Classification,
            AnalysisError::Generation(_) => AnalysisStage::Generation,
        }
    }
}

/// The three strings rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub text_preview: String,
    pub predicted_role: String,
    pub feedback: String,
}

/// Everything one request produced. Fields after the failing stage are absent.
#[derive(Debug, Clone)]
pub struct ResumeAnalysis {
    pub text_preview: String,
    pub ranking: Option<RoleRanking>,
    pub feedback: Option<String>,
    pub error: Option<AnalysisError>,
}

impl ResumeAnalysis {
    fn failed(error: AnalysisError) -> Self {
        Self {
            text_preview: String::new(),
            ranking: None,
            feedback: None,
            error: Some(error),
        }
    }

    pub fn predicted_role(&self) -> Option<JobRole> {
        self.ranking.as_ref().map(|r| r.top().role)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Renders the analysis as (preview, role, feedback), with the failure
    /// message standing in for the field of the stage that failed.
    pub fn display_fields(&self) -> DisplayFields {
        let role = self
            .predicted_role()
            .map(|r| r.label().to_string())
            .unwrap_or_default();
        let feedback = self.feedback.clone().unwrap_or_default();

        match &self.error {
            None => DisplayFields {
                text_preview: self.text_preview.clone(),
                predicted_role: role,
                feedback,
            },
            Some(e @ (AnalysisError::MissingUpload | AnalysisError::Extraction(_))) => {
                DisplayFields {
                    text_preview: e.to_string(),
                    predicted_role: String::new(),
                    feedback: String::new(),
                }
            }
            Some(e @ AnalysisError::Classification(_)) => DisplayFields {
                text_preview: self.text_preview.clone(),
                predicted_role: e.to_string(),
                feedback: String::new(),
            },
            Some(e @ AnalysisError::Generation(_)) => DisplayFields {
                text_preview: self.text_preview.clone(),
                predicted_role: role,
                feedback: e.to_string(),
            },
        }
    }
}

/// Runs the full pipeline on an uploaded document. An absent or zero-length
/// upload short-circuits before any extraction or model call.
pub async fn analyze_resume(
    upload: Option<Bytes>,
    classifier: &dyn RoleClassifier,
    generator: &dyn FeedbackGenerator,
    limits: &AnalysisLimits,
) -> ResumeAnalysis {
    let pdf = match upload.filter(|b| !b.is_empty()) {
        Some(pdf) => pdf,
        None => {
            info!("No resume uploaded, prompting for one");
            return ResumeAnalysis::failed(AnalysisError::MissingUpload);
        }
    };

    info!("Extracting text from {} byte PDF", pdf.len());
    let text = match extract_text(pdf).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Text extraction failed: {e}");
            return ResumeAnalysis::failed(AnalysisError::Extraction(e.to_string()));
        }
    };

    analyze_text(&text, classifier, generator, limits).await
}

/// Classification and feedback over already-extracted resume text.
pub async fn analyze_text(
    text: &str,
    classifier: &dyn RoleClassifier,
    generator: &dyn FeedbackGenerator,
    limits: &AnalysisLimits,
) -> ResumeAnalysis {
    let mut analysis = ResumeAnalysis {
        text_preview: truncate_chars(text, limits.preview_chars).to_string(),
        ranking: None,
        feedback: None,
        error: None,
    };

    let excerpt = truncate_chars(text, limits.excerpt_chars);

    let ranking = match classifier.classify(excerpt, &JobRole::ALL).await {
        Ok(ranking) => ranking,
        Err(e) => {
            warn!("Role classification failed: {e}");
            analysis.error = Some(AnalysisError::Classification(e.to_string()));
            return analysis;
        }
    };
    let top = ranking.top();
    info!("Predicted role: {} (score {:.3})", top.role, top.score);
    analysis.ranking = Some(ranking);

    let prompt = build_feedback_prompt(top.role, excerpt);
    match generator.generate(&prompt, limits.max_feedback_tokens).await {
        Ok(feedback) => {
            info!("Generated {} chars of feedback", feedback.len());
            analysis.feedback = Some(feedback);
        }
        Err(e) => {
            warn!("Feedback generation failed: {e}");
            analysis.error = Some(AnalysisError::Generation(e.to_string()));
        }
    }

    analysis
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::classifier::ClassifierError;
    use crate::analysis::extractor::tests::text_pdf;
    use crate::analysis::feedback::GeneratorError;

    /// Classifier double: answers with fixed scores (or fails) and records its input.
    pub(crate) struct FakeClassifier {
        scores: Option<Vec<(&'static str, f32)>>,
        pub calls: AtomicUsize,
        pub last_input: Mutex<Option<String>>,
    }

    impl FakeClassifier {
        pub(crate) fn answering(scores: Vec<(&'static str, f32)>) -> Self {
            Self {
                scores: Some(scores),
                calls: AtomicUsize::new(0),
                last_input: Mutex::new(None),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                scores: None,
                calls: AtomicUsize::new(0),
                last_input: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RoleClassifier for FakeClassifier {
        async fn classify(
            &self,
            text: &str,
            candidates: &[JobRole],
        ) -> Result<RoleRanking, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() = Some(text.to_string());
            match &self.scores {
                Some(scores) => RoleRanking::from_labels(scores.clone(), candidates),
                None => Err(ClassifierError::EmptyRanking),
            }
        }
    }

    /// Generator double: echoes a fixed reply or fails, and records what it was asked.
    pub(crate) struct FakeGenerator {
        reply: Option<String>,
        pub calls: AtomicUsize,
        pub last_prompt: Mutex<Option<String>>,
        pub last_max_tokens: Mutex<Option<usize>>,
    }

    impl FakeGenerator {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                last_max_tokens: Mutex::new(None),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                last_max_tokens: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl FeedbackGenerator for FakeGenerator {
        async fn generate(
            &self,
            prompt: &str,
            max_tokens: usize,
        ) -> Result<String, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            *self.last_max_tokens.lock().unwrap() = Some(max_tokens);
            self.reply.clone().ok_or(GeneratorError::EmptyGeneration)
        }
    }

    fn engineer_scores() -> Vec<(&'static str, f32)> {
        vec![
            ("Software Engineer", 0.72),
            ("Backend Developer", 0.20),
            ("Data Scientist", 0.04),
            ("Data Analyst", 0.03),
            ("UI/UX Designer", 0.01),
        ]
    }

    #[tokio::test]
    async fn test_no_upload_returns_prompt_without_calling_models() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("unused");

        let analysis =
            analyze_resume(None, &classifier, &generator, &AnalysisLimits::default()).await;

        assert_eq!(analysis.error, Some(AnalysisError::MissingUpload));
        assert_eq!(
            analysis.display_fields(),
            DisplayFields {
                text_preview: "Please upload a PDF resume.".to_string(),
                predicted_role: String::new(),
                feedback: String::new(),
            }
        );
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_byte_upload_counts_as_no_upload() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("unused");

        let analysis = analyze_resume(
            Some(Bytes::new()),
            &classifier,
            &generator,
            &AnalysisLimits::default(),
        )
        .await;

        assert_eq!(analysis.error, Some(AnalysisError::MissingUpload));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_short_circuits() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("unused");

        let analysis = analyze_resume(
            Some(Bytes::from_static(b"%PDF-garbage")),
            &classifier,
            &generator,
            &AnalysisLimits::default(),
        )
        .await;

        assert_eq!(
            analysis.error.as_ref().map(|e| e.stage()),
            Some(AnalysisStage::Extraction)
        );
        let fields = analysis.display_fields();
        assert!(fields.text_preview.starts_with("Error extracting text:"));
        assert!(fields.predicted_role.is_empty());
        assert!(fields.feedback.is_empty());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_pdf_runs_every_stage() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("Add a projects section.");
        let pdf = Bytes::from(text_pdf(&["A", "B", "C"]));

        let analysis =
            analyze_resume(Some(pdf), &classifier, &generator, &AnalysisLimits::default()).await;

        assert!(analysis.is_success());
        let fields = analysis.display_fields();
        assert_eq!(fields.text_preview, "A\nB\nC");
        assert!(!fields.text_preview.starts_with("Error"));
        assert_eq!(fields.predicted_role, "Software Engineer");
        assert_eq!(
            classifier.last_input.lock().unwrap().as_deref(),
            Some("A\nB\nC")
        );
    }

    #[tokio::test]
    async fn test_resume_containing_error_word_is_not_short_circuited() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("Mention incident response metrics.");
        let pdf = Bytes::from(text_pdf(&["Error handling lead", "Rust"]));

        let analysis =
            analyze_resume(Some(pdf), &classifier, &generator, &AnalysisLimits::default()).await;

        assert!(analysis.is_success());
        assert_eq!(analysis.text_preview, "Error handling lead\nRust");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            analysis.feedback.as_deref(),
            Some("Mention incident response metrics.")
        );
    }

    #[tokio::test]
    async fn test_full_analysis_fills_all_fields() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("Quantify the impact of each project.");
        let text = "Jane Doe\nRust, Go, Kubernetes\nBuilt a payments platform";

        let analysis =
            analyze_text(text, &classifier, &generator, &AnalysisLimits::default()).await;

        assert!(analysis.is_success());
        assert_eq!(analysis.predicted_role(), Some(JobRole::SoftwareEngineer));
        let fields = analysis.display_fields();
        assert_eq!(fields.text_preview, text);
        assert_eq!(fields.predicted_role, "Software Engineer");
        assert_eq!(fields.feedback, "Quantify the impact of each project.");
        assert_eq!(
            generator.last_prompt.lock().unwrap().as_deref(),
            Some(
                "Provide resume improvement suggestions for a Software Engineer based on the following:\nJane Doe\nRust, Go, Kubernetes\nBuilt a payments platform"
            )
        );
    }

    #[tokio::test]
    async fn test_excerpt_and_preview_use_their_own_limits() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("ok");
        let text = "x".repeat(5000);

        let analysis =
            analyze_text(&text, &classifier, &generator, &AnalysisLimits::default()).await;

        assert_eq!(analysis.text_preview.chars().count(), 2000);
        let classified = classifier.last_input.lock().unwrap().clone().unwrap();
        assert_eq!(classified.chars().count(), 1000);
        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.ends_with(&"x".repeat(1000)));
        assert!(!prompt.contains(&"x".repeat(1001)));
    }

    #[tokio::test]
    async fn test_classification_failure_keeps_preview_and_skips_generation() {
        let classifier = FakeClassifier::failing();
        let generator = FakeGenerator::replying("unused");

        let analysis = analyze_text(
            "Figma, user research",
            &classifier,
            &generator,
            &AnalysisLimits::default(),
        )
        .await;

        let fields = analysis.display_fields();
        assert_eq!(fields.text_preview, "Figma, user research");
        assert!(fields.predicted_role.starts_with("Error classifying role:"));
        assert!(fields.feedback.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_classifier_label_outside_set_is_a_classification_failure() {
        let classifier = FakeClassifier::answering(vec![("Astronaut", 0.99)]);
        let generator = FakeGenerator::replying("unused");

        let analysis =
            analyze_text("text", &classifier, &generator, &AnalysisLimits::default()).await;

        assert_eq!(analysis.predicted_role(), None);
        assert_eq!(
            analysis.error.as_ref().map(|e| e.stage()),
            Some(AnalysisStage::Classification)
        );
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_preview_and_role() {
        let classifier = FakeClassifier::answering(vec![("Data Analyst", 0.9)]);
        let generator = FakeGenerator::failing();

        let analysis =
            analyze_text("SQL, Tableau", &classifier, &generator, &AnalysisLimits::default())
                .await;

        let fields = analysis.display_fields();
        assert_eq!(fields.text_preview, "SQL, Tableau");
        assert_eq!(fields.predicted_role, "Data Analyst");
        assert!(fields.feedback.starts_with("Error generating feedback:"));
    }

    #[tokio::test]
    async fn test_generator_receives_configured_token_budget() {
        let classifier = FakeClassifier::answering(engineer_scores());
        let generator = FakeGenerator::replying("Lead with impact.");
        let limits = AnalysisLimits {
            max_feedback_tokens: 50,
            ..AnalysisLimits::default()
        };

        let analysis = analyze_text("text", &classifier, &generator, &limits).await;

        assert!(analysis.is_success());
        assert_eq!(*generator.last_max_tokens.lock().unwrap(), Some(50));
    }

    #[test]
    fn test_upload_prompt_matches_missing_upload_message() {
        assert_eq!(AnalysisError::MissingUpload.to_string(), UPLOAD_PROMPT);
    }

    #[test]
    fn test_failure_messages_carry_error_marker() {
        for e in [
            AnalysisError::Extraction("x".into()),
            AnalysisError::Classification("x".into()),
            AnalysisError::Generation("x".into()),
        ] {
            assert!(e.to_string().starts_with("Error"));
        }
    }
}
