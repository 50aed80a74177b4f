//! Role Classifier — pluggable, trait-based zero-shot classification over `JobRole`.
//!
//! Default: `ZeroShotClassifier` (hosted NLI model via `InferenceClient`).
//!
//! `AppState` holds an `Arc<dyn RoleClassifier>`, built once at startup.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::roles::JobRole;
use crate::inference_client::{InferenceClient, InferenceError};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("model returned a label outside the candidate set: {0:?}")]
    UnknownLabel(String),

    #[error("model returned {labels} labels but {scores} scores")]
    MismatchedScores { labels: usize, scores: usize },

    #[error("model returned no labels")]
    EmptyRanking,
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: JobRole,
    pub score: f32,
}

/// Candidate roles ordered by model score, highest first. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleRanking {
    scores: Vec<RoleScore>,
}

impl RoleRanking {
    /// Builds a ranking from raw `(label, score)` pairs as the model reported them.
    ///
    /// Every label must be one of `candidates`. Sorting is stable, so equal
    /// scores keep the model's own order.
    pub fn from_labels<L: AsRef<str>>(
        scored: impl IntoIterator<Item = (L, f32)>,
        candidates: &[JobRole],
    ) -> Result<Self, ClassifierError> {
        let mut scores = scored
            .into_iter()
            .map(|(label, score)| {
                let label = label.as_ref();
                JobRole::from_label(label)
                    .filter(|role| candidates.contains(role))
                    .map(|role| RoleScore { role, score })
                    .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if scores.is_empty() {
            return Err(ClassifierError::EmptyRanking);
        }

        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Ok(Self { scores })
    }

    /// The predicted role.
    pub fn top(&self) -> RoleScore {
        self.scores[0]
    }

    pub fn scores(&self) -> &[RoleScore] {
        &self.scores
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap classification backends without touching the
/// pipeline or the handlers.
#[async_trait]
pub trait RoleClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidates: &[JobRole],
    ) -> Result<RoleRanking, ClassifierError>;
}

// ────────────────────────────────────────────────────────────────────────────
// ZeroShotClassifier — hosted NLI model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    multi_label: bool,
}

/// The endpoint answers either column-wise (`{"sequence", "labels", "scores"}`)
/// or row-wise (`[{"label", "score"}]`) depending on its version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns { labels: Vec<String>, scores: Vec<f32> },
    Rows(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

impl ZeroShotResponse {
    fn into_pairs(self) -> Result<Vec<(String, f32)>, ClassifierError> {
        match self {
            ZeroShotResponse::Columns { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(ClassifierError::MismatchedScores {
                        labels: labels.len(),
                        scores: scores.len(),
                    });
                }
                Ok(labels.into_iter().zip(scores).collect())
            }
            ZeroShotResponse::Rows(rows) => {
                Ok(rows.into_iter().map(|r| (r.label, r.score)).collect())
            }
        }
    }
}

pub struct ZeroShotClassifier {
    client: InferenceClient,
    model: String,
}

impl ZeroShotClassifier {
    pub fn new(client: InferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl RoleClassifier for ZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        candidates: &[JobRole],
    ) -> Result<RoleRanking, ClassifierError> {
        let labels: Vec<&str> = candidates.iter().map(|r| r.label()).collect();
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
                multi_label: false,
            },
        };

        let response: ZeroShotResponse = self.client.call(&self.model, &request).await?;
        RoleRanking::from_labels(response.into_pairs()?, candidates)
    }
}
