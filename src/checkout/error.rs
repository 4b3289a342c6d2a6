use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;
use crate::validator::LineProblem;

/// Why a checkout did not produce an order. In every case nothing was written.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutFailure {
    #[error("Invalid checkout request: {0}")]
    InvalidRequest(String),
    #[error("{} cart line problem(s)", .0.len())]
    ItemsUnavailable(Vec<LineProblem>),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Coarse failure class the caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    InvalidRequest,
    ItemsUnavailable,
    StorageError,
}

impl CheckoutFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckoutFailure::InvalidRequest(_) => FailureKind::InvalidRequest,
            CheckoutFailure::ItemsUnavailable(_) => FailureKind::ItemsUnavailable,
            CheckoutFailure::Storage(_) => FailureKind::StorageError,
        }
    }

    pub fn problems(&self) -> &[LineProblem] {
        match self {
            CheckoutFailure::ItemsUnavailable(problems) => problems,
            _ => &[],
        }
    }
}

/// Wire shape of a failed checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<LineProblem>,
}

impl From<&CheckoutFailure> for FailureResponse {
    fn from(failure: &CheckoutFailure) -> Self {
        let message = match failure {
            // Storage details stay in the logs.
            CheckoutFailure::Storage(_) => "Checkout could not be completed, please retry".to_string(),
            other => other.to_string(),
        };
        Self {
            kind: failure.kind(),
            message,
            problems: failure.problems().to_vec(),
        }
    }
}
