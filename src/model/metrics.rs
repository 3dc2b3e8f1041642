//! Holdout evaluation metrics

use serde::{Deserialize, Serialize};

const LOG_LOSS_EPS: f64 = 1e-15;

/// Mean squared error between probabilities and outcomes
///
/// 0.0 is perfect, 0.25 is a constant 50% forecast.
pub fn brier_score(outcomes: &[bool], probabilities: &[f64]) -> f64 {
    let n = outcomes.len().min(probabilities.len());
    if n == 0 {
        return 0.0;
    }
    let total: f64 = outcomes
        .iter()
        .zip(probabilities)
        .map(|(&y, &p)| {
            let target = if y { 1.0 } else { 0.0 };
            (p - target).powi(2)
        })
        .sum();
    total / n as f64
}

/// Mean negative log-likelihood, with probabilities clipped away from 0 and 1
pub fn log_loss(outcomes: &[bool], probabilities: &[f64]) -> f64 {
    let n = outcomes.len().min(probabilities.len());
    if n == 0 {
        return 0.0;
    }
    let total: f64 = outcomes
        .iter()
        .zip(probabilities)
        .map(|(&y, &p)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if y {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / n as f64
}

/// Area under the ROC curve (Mann-Whitney U with tied ranks averaged)
///
/// `None` when the outcomes contain a single class.
pub fn auc(outcomes: &[bool], probabilities: &[f64]) -> Option<f64> {
    let n = outcomes.len().min(probabilities.len());
    let positives = outcomes[..n].iter().filter(|&&y| y).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| probabilities[a].total_cmp(&probabilities[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && probabilities[order[j + 1]] == probabilities[order[i]] {
            j += 1;
        }
        // 1-based average rank of the tied block
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = (0..n).filter(|&k| outcomes[k]).map(|k| ranks[k]).sum();
    let p = positives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    Some(u / (p * negatives as f64))
}

/// Holdout evaluation of a trained classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub n_train: usize,
    pub n_test: usize,
    pub brier: Option<f64>,
    pub log_loss: Option<f64>,
    pub auc: Option<f64>,
    /// Why some metrics are missing
    pub note: Option<String>,
}

impl EvaluationReport {
    /// Score holdout predictions
    ///
    /// A holdout with one outcome class only gets a Brier score; log loss
    /// and AUC would be misleading there.
    pub fn evaluate(n_train: usize, outcomes: &[bool], probabilities: &[f64]) -> Self {
        let n_test = outcomes.len().min(probabilities.len());
        if n_test == 0 {
            return Self {
                n_train,
                n_test,
                brier: None,
                log_loss: None,
                auc: None,
                note: Some("no holdout rows; lower test_fraction or add games".to_string()),
            };
        }

        let brier = Some(brier_score(outcomes, probabilities));
        match auc(outcomes, probabilities) {
            Some(area) => Self {
                n_train,
                n_test,
                brier,
                log_loss: Some(log_loss(outcomes, probabilities)),
                auc: Some(area),
                note: None,
            },
            None => Self {
                n_train,
                n_test,
                brier,
                log_loss: None,
                auc: None,
                note: Some(
                    "test set contains a single class; add more games for full metrics"
                        .to_string(),
                ),
            },
        }
    }

    /// Whether the holdout was too small or one-sided for full metrics
    pub fn is_degenerate(&self) -> bool {
        self.note.is_some()
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let metric = |v: Option<f64>| match v {
            Some(v) => format!("{:.4}", v),
            None => "n/a".to_string(),
        };
        let mut out = format!(
            r#"
══════════════════════════════════════════════════════
               VALIDATION METRICS
══════════════════════════════════════════════════════
Train Rows:       {}
Holdout Rows:     {}
Brier Score:      {}
Log Loss:         {}
ROC AUC:          {}
"#,
            self.n_train,
            self.n_test,
            metric(self.brier),
            metric(self.log_loss),
            metric(self.auc),
        );
        if let Some(note) = &self.note {
            out.push_str(&format!("Note:             {}\n", note));
        }
        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}
