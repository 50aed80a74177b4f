//! The closed set of job roles a resume can be classified into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Candidate role labels. The set is fixed; the classifier is only ever asked
/// to choose among these and any other label in its answer is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobRole {
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Backend Developer")]
    BackendDeveloper,
    #[serde(rename = "UI/UX Designer")]
    UiUxDesigner,
}

impl JobRole {
    /// All roles, in the order they are offered to the classifier.
    pub const ALL: [JobRole; 5] = [
        JobRole::SoftwareEngineer,
        JobRole::DataAnalyst,
        JobRole::DataScientist,
        JobRole::BackendDeveloper,
        JobRole::UiUxDesigner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            JobRole::SoftwareEngineer => "Software Engineer",
            JobRole::DataAnalyst => "Data Analyst",
            JobRole::DataScientist => "Data Scientist",
            JobRole::BackendDeveloper => "Backend Developer",
            JobRole::UiUxDesigner => "UI/UX Designer",
        }
    }

    /// Exact match against the label text (surrounding whitespace ignored).
    pub fn from_label(label: &str) -> Option<JobRole> {
        let label = label.trim();
        Self::ALL.into_iter().find(|r| r.label() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.label()).collect()
    }
}

impl fmt::Display for JobRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
