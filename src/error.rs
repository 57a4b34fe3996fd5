//! Error types for schedule transcoding
//!
//! Errors are grouped by where they surface:
//! - Codec: local, synchronous encode/decode/recovery failures. Never retried.
//! - Model: the external text-generation command. Some are retryable.
//! - Pipeline: either of the above, or a model reply that is not a schedule.

use chrono::NaiveDate;
use thiserror::Error;

/// Encode/decode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Invalid date component: {0}")]
    InvalidDateComponent(String),

    #[error("Cannot encode an empty schedule")]
    EmptySchedule,

    #[error("First schedule day has an invalid date: {0}")]
    InvalidFirstDate(String),

    #[error("Schedule for {month} is missing days: {missing}")]
    IncompleteMonth { month: String, missing: String },

    #[error("Line {line}: cannot resolve date from '{header}': {reason}")]
    DateResolutionError {
        line: usize,
        header: String,
        reason: String,
    },

    #[error("Line {line}: malformed schedule line '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("Line {line}: {date} appears more than once")]
    DuplicateDate { line: usize, date: NaiveDate },

    #[error("Could not recover a schedule from the response: {0}")]
    RecoveryFailed(String),
}

impl CodecError {
    /// True when the failure came from parsing annotated text.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CodecError::DateResolutionError { .. }
                | CodecError::MalformedLine { .. }
                | CodecError::DuplicateDate { .. }
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CodecError::InvalidDateComponent(_) => "Use a month between 1 and 12 and a valid day.",
            CodecError::EmptySchedule => "Provide at least one day to render.",
            CodecError::InvalidFirstDate(_) => "Dates must be formatted as YYYY-MM-DD.",
            CodecError::IncompleteMonth { .. } => {
                "Add the missing days (use an empty stripe list for days off)."
            }
            CodecError::DateResolutionError { .. } => {
                "Check the month name, day number and reference year on that line."
            }
            CodecError::MalformedLine { .. } => {
                "Each line must read '<Wkd> <Mon> <Day> - <entries>' or end in '- empty'."
            }
            CodecError::DuplicateDate { .. } => "Remove the repeated day from the text.",
            CodecError::RecoveryFailed(_) => {
                "The service returned JSON that is not a day list. Ask it for plain text again."
            }
        }
    }
}

/// External model command failures
#[derive(Debug, Error)]
pub enum ModelError {
    // Retryable errors
    #[error("Model command timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model rate limit exceeded")]
    RateLimited,

    #[error("Model returned an empty response")]
    EmptyResponse,

    // Requires operator action
    #[error("Model command not found: {0}")]
    CommandNotFound(String),

    #[error("Model command is not authenticated")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(String),
}

impl ModelError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelError::Timeout(_) | ModelError::RateLimited | ModelError::EmptyResponse
        )
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}

/// Failures of a full transcoding call, model included
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model output is not a schedule: {0}")]
    InvalidModelOutput(String),
}

/// Serializable error representation for operators
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecErrorReport {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Decode,
    Encode,
    Recovery,
    Model,
}

impl From<&CodecError> for CodecErrorReport {
    fn from(err: &CodecError) -> Self {
        let error_type = if err.is_decode_error() {
            ErrorType::Decode
        } else if matches!(err, CodecError::RecoveryFailed(_)) {
            ErrorType::Recovery
        } else {
            ErrorType::Encode
        };

        CodecErrorReport {
            message: err.to_string(),
            error_type,
            can_retry: false,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

impl From<&PipelineError> for CodecErrorReport {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::Codec(codec) => CodecErrorReport::from(codec),
            PipelineError::Model(model) => CodecErrorReport {
                message: model.to_string(),
                error_type: ErrorType::Model,
                can_retry: model.is_retryable(),
                recovery_suggestion: "Check the model command configuration and try again."
                    .to_string(),
            },
            PipelineError::InvalidModelOutput(_) => CodecErrorReport {
                message: err.to_string(),
                error_type: ErrorType::Model,
                can_retry: true,
                recovery_suggestion: "Run the request again or fix the text so it decodes locally."
                    .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_classifies_decode_errors() {
        let err = CodecError::MalformedLine {
            line: 3,
            text: "garbage".to_string(),
        };
        let report = CodecErrorReport::from(&err);
        assert_eq!(report.error_type, ErrorType::Decode);
        assert!(!report.can_retry);
        assert!(report.message.contains("Line 3"));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = CodecErrorReport::from(&CodecError::EmptySchedule);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errorType"], "encode");
        assert_eq!(json["canRetry"], false);
        assert!(json["recoverySuggestion"].as_str().unwrap().contains("at least one day"));
    }

    #[test]
    fn test_model_errors_retryable() {
        assert!(ModelError::Timeout(30).is_retryable());
        assert!(ModelError::RateLimited.is_retryable());
        assert!(!ModelError::NotAuthenticated.is_retryable());
        assert!(!ModelError::CommandNotFound("claude".to_string()).is_retryable());
    }

    #[test]
    fn test_pipeline_report_for_model_error() {
        let err = PipelineError::from(ModelError::Timeout(5));
        let report = CodecErrorReport::from(&err);
        assert_eq!(report.error_type, ErrorType::Model);
        assert!(report.can_retry);
    }
}
