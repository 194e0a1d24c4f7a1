//! Multinomial logistic regression fitted with L-BFGS.
//!
//! Minimizes the mean softmax cross-entropy plus `||W||^2 / (2 C n)`; the
//! intercepts are not penalized. The optimizer is deterministic: zero
//! initialization, two-loop L-BFGS direction, backtracking Armijo line search.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{argmax, check_training_set, class_position, Classifier};
use crate::domain::{Category, Result};
use crate::features::SparseVector;

const HISTORY: usize = 10;
const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;
const RELATIVE_FTOL: f64 = 2.220446049250313e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop when the largest gradient component falls below this.
    pub tol: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-4,
        }
    }
}

/// Fitted softmax regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<Category>,
    /// `coef[c]` is the weight vector of class `c`.
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    iterations: usize,
}

/// Parameter layout: `k` weight rows of length `dim`, then `k` intercepts.
struct Objective<'a> {
    xs: &'a [SparseVector],
    targets: Vec<usize>,
    k: usize,
    dim: usize,
    penalty: f64,
}

impl Objective<'_> {
    fn len(&self) -> usize {
        self.k * (self.dim + 1)
    }

    fn logits(&self, theta: &[f64], x: &SparseVector) -> Vec<f64> {
        (0..self.k)
            .map(|c| x.dot(&theta[c * self.dim..(c + 1) * self.dim]) + theta[self.k * self.dim + c])
            .collect()
    }

    /// Loss and gradient at `theta`.
    fn evaluate(&self, theta: &[f64]) -> (f64, Vec<f64>) {
        let n = self.xs.len() as f64;
        let mut loss = 0.0;
        let mut grad = vec![0.0; self.len()];

        for (x, &target) in self.xs.iter().zip(&self.targets) {
            let z = self.logits(theta, x);
            let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let sum_exp: f64 = z.iter().map(|v| (v - max).exp()).sum();
            let log_norm = max + sum_exp.ln();
            loss += log_norm - z[target];

            for c in 0..self.k {
                let mut residual = (z[c] - log_norm).exp();
                if c == target {
                    residual -= 1.0;
                }
                let residual = residual / n;
                if residual == 0.0 {
                    continue;
                }
                for (j, v) in x.iter() {
                    grad[c * self.dim + j] += residual * v;
                }
                grad[self.k * self.dim + c] += residual;
            }
        }

        loss /= n;
        let weights = &theta[..self.k * self.dim];
        loss += 0.5 * self.penalty * weights.iter().map(|w| w * w).sum::<f64>();
        for (g, w) in grad.iter_mut().zip(weights) {
            *g += self.penalty * w;
        }
        (loss, grad)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Two-loop recursion: returns the quasi-Newton descent direction.
fn lbfgs_direction(grad: &[f64], history: &VecDeque<(Vec<f64>, Vec<f64>, f64)>) -> Vec<f64> {
    let mut q: Vec<f64> = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());
    for (s, y, rho) in history.iter().rev() {
        let a = rho * dot(s, &q);
        for (qi, yi) in q.iter_mut().zip(y) {
            *qi -= a * yi;
        }
        alphas.push(a);
    }

    if let Some((s, y, _)) = history.back() {
        let gamma = dot(s, y) / dot(y, y);
        for qi in q.iter_mut() {
            *qi *= gamma;
        }
    }

    for ((s, y, rho), a) in history.iter().zip(alphas.into_iter().rev()) {
        let b = rho * dot(y, &q);
        for (qi, si) in q.iter_mut().zip(s) {
            *qi += (a - b) * si;
        }
    }

    q.iter().map(|v| -v).collect()
}

impl LogisticRegression {
    pub fn fit(xs: &[SparseVector], ys: &[Category], params: &LogisticParams) -> Result<Self> {
        let classes = check_training_set(xs, ys)?;
        let objective = Objective {
            xs,
            targets: ys.iter().map(|y| class_position(&classes, *y)).collect(),
            k: classes.len(),
            dim: xs[0].dim(),
            penalty: 1.0 / (params.c * xs.len() as f64),
        };

        let mut theta = vec![0.0; objective.len()];
        let (mut loss, mut grad) = objective.evaluate(&theta);
        let mut history: VecDeque<(Vec<f64>, Vec<f64>, f64)> = VecDeque::with_capacity(HISTORY);
        let mut iterations = 0;

        while iterations < params.max_iter && max_abs(&grad) > params.tol {
            iterations += 1;
            let mut direction = lbfgs_direction(&grad, &history);
            let mut slope = dot(&grad, &direction);
            if slope >= 0.0 {
                // Curvature pairs went stale; restart from steepest descent.
                history.clear();
                direction = grad.iter().map(|g| -g).collect();
                slope = dot(&grad, &direction);
            }

            let mut step = if history.is_empty() {
                (1.0 / dot(&grad, &grad).sqrt()).min(1.0)
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate: Vec<f64> = theta
                    .iter()
                    .zip(&direction)
                    .map(|(t, d)| t + step * d)
                    .collect();
                let (cand_loss, cand_grad) = objective.evaluate(&candidate);
                if cand_loss <= loss + ARMIJO_C1 * step * slope {
                    accepted = Some((candidate, cand_loss, cand_grad));
                    break;
                }
                step *= 0.5;
            }

            let Some((next, next_loss, next_grad)) = accepted else {
                debug!(model = "lr", iterations, "line search failed; stopping");
                break;
            };

            let s: Vec<f64> = next.iter().zip(&theta).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = next_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > 1e-10 {
                if history.len() == HISTORY {
                    history.pop_front();
                }
                history.push_back((s, y, 1.0 / sy));
            }

            let reduction = (loss - next_loss) / loss.abs().max(next_loss.abs()).max(1.0);
            theta = next;
            loss = next_loss;
            grad = next_grad;
            if reduction <= RELATIVE_FTOL {
                break;
            }
        }

        debug!(model = "lr", iterations, loss, "logistic regression fitted");

        let k = objective.k;
        let dim = objective.dim;
        let coef = (0..k)
            .map(|c| theta[c * dim..(c + 1) * dim].to_vec())
            .collect();
        let intercept = theta[k * dim..].to_vec();

        Ok(Self {
            classes,
            coef,
            intercept,
            iterations,
        })
    }

    /// Class probabilities in class order.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        let z: Vec<f64> = self.decision_function(x);
        let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = z.iter().map(|v| (v - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / total).collect()
    }

    pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| x.dot(w) + b)
            .collect()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "lr"
    }

    fn classes(&self) -> &[Category] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    fn predict(&self, x: &SparseVector) -> Category {
        self.classes[argmax(&self.decision_function(x))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<SparseVector>, Vec<Category>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for _ in 0..4 {
            xs.push(SparseVector::from_pairs(3, vec![(0, 1.0)]));
            ys.push(Category::Ti);
            xs.push(SparseVector::from_pairs(3, vec![(1, 1.0)]));
            ys.push(Category::Finanzas);
            xs.push(SparseVector::from_pairs(3, vec![(2, 0.6), (1, 0.8)]));
            ys.push(Category::SoporteGeneral);
        }
        (xs, ys)
    }

    #[test]
    fn fits_training_data() {
        let (xs, ys) = data();
        let lr = LogisticRegression::fit(&xs, &ys, &LogisticParams::default()).unwrap();
        assert_eq!(lr.predict_all(&xs), ys);
        assert!(lr.iterations() > 0);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (xs, ys) = data();
        let lr = LogisticRegression::fit(&xs, &ys, &LogisticParams::default()).unwrap();
        let p = lr.predict_proba(&xs[0]);
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(argmax(&p), 2);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let (xs, ys) = data();
        let classes = check_training_set(&xs, &ys).unwrap();
        let objective = Objective {
            xs: &xs,
            targets: ys.iter().map(|y| class_position(&classes, *y)).collect(),
            k: classes.len(),
            dim: 3,
            penalty: 0.1,
        };
        let theta: Vec<f64> = (0..objective.len()).map(|i| 0.05 * i as f64 - 0.2).collect();
        let (_, grad) = objective.evaluate(&theta);
        let h = 1e-6;
        for i in 0..theta.len() {
            let mut plus = theta.clone();
            plus[i] += h;
            let mut minus = theta.clone();
            minus[i] -= h;
            let numeric = (objective.evaluate(&plus).0 - objective.evaluate(&minus).0) / (2.0 * h);
            assert!((numeric - grad[i]).abs() < 1e-6, "component {i}");
        }
    }

    #[test]
    fn fit_is_deterministic() {
        let (xs, ys) = data();
        let a = LogisticRegression::fit(&xs, &ys, &LogisticParams::default()).unwrap();
        let b = LogisticRegression::fit(&xs, &ys, &LogisticParams::default()).unwrap();
        assert_eq!(a, b);
    }
}
