use thiserror::Error;

/// Errors raised by the series, baseline, metric and probability stages.
///
/// `MalformedSeries`, `MissingColumn` and `InvalidSigma` abort the operation
/// that raised them. `InsufficientBaselineData` and `DegenerateBaseline` are
/// kept per day and only make that day's results missing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("malformed series {label}: {reason}")]
    MalformedSeries { label: String, reason: String },

    #[error("missing column {label}")]
    MissingColumn { label: String },

    #[error("insufficient baseline data for day {day}: need at least 2 values, got {n_vals}")]
    InsufficientBaselineData { day: usize, n_vals: usize },

    #[error("degenerate baseline for day {day}: standard deviation is {std_dev}")]
    DegenerateBaseline { day: usize, std_dev: f64 },

    #[error("invalid sigma {0}: must be finite and non-negative")]
    InvalidSigma(f64),
}

impl Error {
    pub fn malformed(label: impl ToString, reason: impl ToString) -> Self {
        Self::MalformedSeries {
            label: label.to_string(),
            reason: reason.to_string(),
        }
    }
}
