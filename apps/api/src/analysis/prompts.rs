// Prompt templates for the feedback generator.

/// Feedback prompt template. Replace `{role}` and `{resume_excerpt}` before sending.
pub const FEEDBACK_PROMPT_TEMPLATE: &str =
    "Provide resume improvement suggestions for a {role} based on the following:\n{resume_excerpt}";

/// Shown in place of the preview when a request carries no file.
pub const UPLOAD_PROMPT: &str = "Please upload a PDF resume.";
