use tether_store::StoreError;
use tether_types::TypeError;

/// Errors that can occur during evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A record handed to the evaluator breaks its structural invariants.
    /// Raised before any store call is made.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] TypeError),

    /// The live store failed. Passed through untouched; retry policy belongs
    /// to the caller.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Evaluator configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl EvalError {
    /// Returns `true` for contract violations that retrying cannot fix.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
