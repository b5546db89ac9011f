use thiserror::Error;

/// Failures raised while turning a request into a prediction.
///
/// `NoHistory` and `CorruptedOutput` are resolved by the rank fallback inside
/// the prediction service; the other two reach the HTTP boundary as 500s.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("no history for {team} as {side} team")]
    NoHistory { team: String, side: &'static str },

    #[error("model output corrupted (NaN probability)")]
    CorruptedOutput,

    #[error("Unhandled validation error: {0}")]
    Validation(String),

    #[error("Server Error: {0}")]
    Server(String),
}

impl PredictError {
    /// Whether the rank-based fallback answers this failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PredictError::NoHistory { .. } | PredictError::CorruptedOutput)
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
