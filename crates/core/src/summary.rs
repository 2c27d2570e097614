//! Consultation summaries.
//!
//! A summary is produced by an external collaborator (typically a language-model client) from
//! the free-text notes of a history entry. Summaries are display-only: they are never written
//! back into the clinical record, and a failing collaborator degrades to a fixed placeholder
//! rather than an error.

use crate::constants::SUMMARY_PLACEHOLDER;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("summariser unavailable: {0}")]
    Unavailable(String),
    #[error("summariser returned an empty summary")]
    Empty,
}

/// Produces a natural-language summary of consultation notes.
pub trait ConsultationSummariser: Send + Sync {
    fn summarise(&self, notes: &str) -> Result<String, SummaryError>;
}

/// Result of a best-effort summary request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "text", rename_all = "camelCase")]
pub enum SummaryOutcome {
    Summary(String),
    /// The collaborator failed; carries the placeholder shown instead.
    Unavailable(String),
}

impl SummaryOutcome {
    pub fn text(&self) -> &str {
        match self {
            SummaryOutcome::Summary(text) | SummaryOutcome::Unavailable(text) => text,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, SummaryOutcome::Summary(_))
    }
}

/// Asks `summariser` for a summary of `notes`, replacing any failure with the placeholder.
pub fn summarise_best_effort(
    summariser: &dyn ConsultationSummariser,
    notes: &str,
) -> SummaryOutcome {
    let result = summariser.summarise(notes).and_then(|text| {
        let text = text.trim();
        if text.is_empty() {
            Err(SummaryError::Empty)
        } else {
            Ok(text.to_string())
        }
    });

    match result {
        Ok(text) => SummaryOutcome::Summary(text),
        Err(e) => {
            tracing::warn!(error = %e, "consultation summary failed");
            SummaryOutcome::Unavailable(SUMMARY_PLACEHOLDER.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstSentence;

    impl ConsultationSummariser for FirstSentence {
        fn summarise(&self, notes: &str) -> Result<String, SummaryError> {
            Ok(notes.split('.').next().unwrap_or_default().to_string())
        }
    }

    struct Offline;

    impl ConsultationSummariser for Offline {
        fn summarise(&self, _notes: &str) -> Result<String, SummaryError> {
            Err(SummaryError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn successful_summary_is_returned() {
        let outcome = summarise_best_effort(&FirstSentence, "Dolor en el talón. Reposo.");
        assert_eq!(outcome, SummaryOutcome::Summary("Dolor en el talón".into()));
        assert!(outcome.is_summary());
    }

    #[test]
    fn failure_becomes_placeholder() {
        let outcome = summarise_best_effort(&Offline, "Dolor en el talón.");
        assert_eq!(outcome.text(), "Error generating summary.");
        assert!(!outcome.is_summary());
    }

    #[test]
    fn blank_summary_becomes_placeholder() {
        let outcome = summarise_best_effort(&FirstSentence, ". nada");
        assert_eq!(outcome, SummaryOutcome::Unavailable(SUMMARY_PLACEHOLDER.into()));
    }

    #[test]
    fn outcome_json_shape() {
        let json = serde_json::to_value(SummaryOutcome::Summary("ok".into())).expect("json");
        assert_eq!(json, serde_json::json!({"outcome": "summary", "text": "ok"}));
    }
}
