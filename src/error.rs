use thiserror::Error;

use crate::panel::Sex;

/// Failures of a single screening request. None of them are retried.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("no reference ranges configured for sex '{0}'")]
    UnknownSex(Sex),

    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("invalid reference range: low={low} high={high}")]
    InvalidRange { low: f64, high: f64 },

    #[error("invalid panel: {0}")]
    InvalidPanel(String),
}
