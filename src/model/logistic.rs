//! Logistic regression win-probability model
//!
//! A single `Linear(N_FEATURES, 1)` layer with a sigmoid head, trained in
//! full batch on standardised inputs with SGD on binary cross-entropy plus
//! an L2 penalty on the weights.

use super::metrics::EvaluationReport;
use super::{ModelError, WinProbabilityModel};
use crate::config::ModelConfig;
use crate::features::{FeatureVector, MatchupFeatureRow, N_FEATURES};
use burn::backend::{Autodiff, NdArray};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

type TrainBackend = Autodiff<NdArray<f32>>;
type InferenceBackend = NdArray<f32>;

/// Floor for a feature's standard deviation; constant features keep scale 1
const MIN_SCALE: f32 = 1e-6;

/// Fitted logistic regression over the matchup feature vector
///
/// Parameters are copied out of the trained layer so the model is plain data
/// that serialises to JSON and can be shared across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: [f64; N_FEATURES],
    pub bias: f64,
    /// Per-feature training mean
    pub means: [f64; N_FEATURES],
    /// Per-feature training standard deviation (1.0 for constant features)
    pub scales: [f64; N_FEATURES],
}

impl LogisticModel {
    /// Fit on labelled rows; rows without a target are skipped
    pub fn fit(rows: &[MatchupFeatureRow], config: &ModelConfig) -> Result<Self, ModelError> {
        let (xs, ys) = labelled(rows)?;
        if xs.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if ys.iter().all(|&y| y) || ys.iter().all(|&y| !y) {
            return Err(ModelError::SingleClass);
        }

        let device = Default::default();
        let n = xs.len();
        let x = features_tensor::<TrainBackend>(&xs, &device);
        let targets: Vec<f32> = ys.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();
        let y = Tensor::<TrainBackend, 1>::from_floats(targets.as_slice(), &device)
            .unsqueeze_dim(1);

        let means = x.clone().mean_dim(0);
        let std = (x.clone() - means.clone()).powf_scalar(2.0).mean_dim(0).sqrt();
        let scales = std.clone().mask_fill(std.lower_elem(MIN_SCALE), 1.0);
        let z = (x - means.clone()) / scales.clone();

        let mut model: Linear<TrainBackend> = LinearConfig::new(N_FEATURES, 1)
            .with_initializer(Initializer::Zeros)
            .init(&device);
        let mut optimizer = SgdConfig::new().init::<TrainBackend, Linear<TrainBackend>>();
        let l2 = config.l2_penalty / (2.0 * n as f64);

        let mut final_loss = 0.0;
        for _ in 0..config.max_iter {
            let probs = sigmoid(model.forward(z.clone()));
            let penalty = model.weight.val().powf_scalar(2.0).sum().mul_scalar(l2);
            let loss = binary_cross_entropy(probs, y.clone()) + penalty;
            final_loss = loss.clone().into_scalar().elem::<f64>();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        let bias = match &model.bias {
            Some(bias) => {
                let [bias]: [f64; 1] = to_array(bias.val())?;
                bias
            }
            None => 0.0,
        };
        let fitted = Self {
            weights: to_array(model.weight.val())?,
            bias,
            means: to_array(means)?,
            scales: to_array(scales)?,
        };

        tracing::debug!(
            rows = n,
            iterations = config.max_iter,
            loss = final_loss,
            bias = fitted.bias,
            "Fitted logistic model"
        );

        Ok(fitted)
    }

    /// Write the model as JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!(path = ?path, "Saved model");
        Ok(())
    }

    /// Read a model written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Home-win probabilities for a batch of feature vectors
    pub fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let device = Default::default();
        let probs = self.forward(features_tensor::<InferenceBackend>(rows, &device));
        to_vec(probs)
    }

    fn forward<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = x.device();
        let row = |values: &[f64; N_FEATURES]| {
            let values: Vec<f32> = values.iter().map(|&v| v as f32).collect();
            Tensor::<B, 1>::from_floats(values.as_slice(), &device).unsqueeze_dim::<2>(0)
        };
        let means = row(&self.means);
        let scales = row(&self.scales);
        let weights = row(&self.weights).transpose();

        let z = (x - means) / scales;
        sigmoid(z.matmul(weights).add_scalar(self.bias))
    }
}

impl WinProbabilityModel for LogisticModel {
    fn predict_home_win(&self, features: &FeatureVector) -> f64 {
        let device = Default::default();
        let x = features_tensor::<InferenceBackend>(std::slice::from_ref(features), &device);
        self.forward(x).into_scalar().elem::<f64>()
    }
}

/// Fit on the earliest games and evaluate on the most recent ones
///
/// The holdout is the last `ceil(test_fraction * n)` labelled rows, in input
/// order, so feature tables should be passed chronologically.
pub fn train_model(
    rows: &[MatchupFeatureRow],
    config: &ModelConfig,
) -> Result<(LogisticModel, EvaluationReport), ModelError> {
    if !(0.0..1.0).contains(&config.test_fraction) {
        return Err(ModelError::InvalidTestFraction(config.test_fraction));
    }

    let labelled_rows: Vec<MatchupFeatureRow> = rows
        .iter()
        .filter(|r| r.target_home_win.is_some())
        .cloned()
        .collect();
    let n = labelled_rows.len();
    let n_test = (config.test_fraction * n as f64).ceil() as usize;
    let n_train = n - n_test.min(n);
    if n_train == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }

    let (train, test) = labelled_rows.split_at(n_train);
    let model = LogisticModel::fit(train, config)?;

    let outcomes: Vec<bool> = test.iter().filter_map(|r| r.target_home_win).collect();
    let features: Vec<FeatureVector> = test.iter().map(MatchupFeatureRow::features).collect();
    let probabilities = model.predict_batch(&features)?;
    let report = EvaluationReport::evaluate(n_train, &outcomes, &probabilities);

    if report.is_degenerate() {
        tracing::warn!(
            n_test = report.n_test,
            note = report.note.as_deref().unwrap_or_default(),
            "Holdout evaluation is incomplete"
        );
    }
    tracing::info!(
        n_train,
        n_test = report.n_test,
        brier = report.brier,
        auc = report.auc,
        "Trained win-probability model"
    );

    Ok((model, report))
}

/// Mean binary cross-entropy, with probabilities clamped away from 0 and 1
fn binary_cross_entropy<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let eps = 1e-7;
    let probs = probs.clamp(eps, 1.0 - eps);
    let loss = targets.clone().neg() * probs.clone().log()
        - (targets.neg() + 1.0) * (probs.neg() + 1.0).log();
    loss.mean()
}

/// Stack feature vectors into an `[n, N_FEATURES]` tensor
fn features_tensor<B: Backend>(rows: &[FeatureVector], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = rows.iter().flatten().map(|&v| v as f32).collect();
    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([rows.len(), N_FEATURES])
}

/// Copy a tensor's values out as `f64`
fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f64>, ModelError> {
    let values = tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| ModelError::Backend(format!("{:?}", e)))?;
    Ok(values.into_iter().map(f64::from).collect())
}

/// Copy a tensor's values out into a fixed-size array
fn to_array<const N: usize, B: Backend, const D: usize>(
    tensor: Tensor<B, D>,
) -> Result<[f64; N], ModelError> {
    let values = to_vec(tensor)?;
    let len = values.len();
    values
        .try_into()
        .map_err(|_| ModelError::Shape { expected: N, actual: len })
}

fn labelled(rows: &[MatchupFeatureRow]) -> Result<(Vec<FeatureVector>, Vec<bool>), ModelError> {
    let mut xs = Vec::with_capacity(rows.len());
    let mut ys = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let Some(target) = row.target_home_win else {
            continue;
        };
        let x = row.features();
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite(i));
        }
        xs.push(x);
        ys.push(target);
    }
    Ok((xs, ys))
}
