use quantlens_core::{BarViolation, DataError};
use quantlens_indicators::IndicatorError;
use serde::Serialize;
use tracing::warn;

/// Failure while deriving indicators from a retrieved series.
#[derive(Debug, thiserror::Error)]
pub enum ComputationError {
    #[error(transparent)]
    InvalidBar(#[from] BarViolation),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
    #[error("{metric} is not a representable number ({value})")]
    NonFinite { metric: &'static str, value: f64 },
}

/// Everything an assembler call can fail with.
///
/// Both variants display their inner message unchanged, so a data source
/// error reaches the caller exactly as the provider reported it.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

/// Serialisable all-or-nothing result of one assembler call.
///
/// Renders as the snapshot itself on success, or as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Success(T),
    Failure { error: String },
}

impl<T> Envelope<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Failure { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Failure { error } => Some(error),
            Envelope::Success(_) => None,
        }
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Envelope::Success(value) => Some(value),
            Envelope::Failure { .. } => None,
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for Envelope<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Envelope::Success(value),
            Err(e) => {
                warn!(error = %e, "Analysis failed");
                Envelope::Failure {
                    error: e.to_string(),
                }
            }
        }
    }
}
