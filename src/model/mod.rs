//! Win-probability model module
//!
//! The classifier boundary the scoring pipeline consumes, plus a logistic
//! regression reference classifier and holdout evaluation.

mod logistic;
mod metrics;

pub use logistic::{train_model, LogisticModel};
pub use self::metrics::{auc, brier_score, log_loss, EvaluationReport};

use crate::features::FeatureVector;
use thiserror::Error;

/// Trait for home-win probability models
pub trait WinProbabilityModel: Send + Sync {
    /// Probability that the home side wins, given features in
    /// [`FEATURE_COLUMNS`](crate::features::FEATURE_COLUMNS) order
    fn predict_home_win(&self, features: &FeatureVector) -> f64;
}

impl<F> WinProbabilityModel for F
where
    F: Fn(&FeatureVector) -> f64 + Send + Sync,
{
    fn predict_home_win(&self, features: &FeatureVector) -> f64 {
        self(features)
    }
}

/// Model training errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("No labelled rows to train on")]
    EmptyTrainingSet,
    #[error("Training rows contain a single class; need both home wins and losses")]
    SingleClass,
    #[error("Invalid test fraction {0}, expected a value in [0, 1)")]
    InvalidTestFraction(f64),
    #[error("Row {0}: non-finite feature value")]
    NonFinite(usize),
    #[error("Tensor backend error: {0}")]
    Backend(String),
    #[error("Expected {expected} parameters, got {actual}")]
    Shape { expected: usize, actual: usize },
    #[error("Model I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
