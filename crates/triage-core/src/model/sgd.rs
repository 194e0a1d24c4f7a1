//! Linear SVM trained by stochastic gradient descent on the hinge loss.
//!
//! Multiclass problems are fitted one-vs-rest; a two-class problem uses a
//! single binary model whose positive side is the second class. The learning
//! rate follows the "optimal" schedule `eta = 1 / (alpha * (t0 + t))`, the
//! weights carry an L2 penalty, and samples are visited in a seeded shuffled
//! order each epoch. Training stops early once the epoch loss has failed to
//! improve by `tol * n` for `n_iter_no_change` consecutive epochs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{argmax, check_training_set, Classifier};
use crate::domain::{Category, Result};
use crate::features::SparseVector;

// Rescale the weight vector once the lazy scale factor gets this small.
const MIN_WEIGHT_SCALE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdParams {
    /// L2 regularization strength.
    pub alpha: f64,
    pub max_iter: usize,
    /// Stopping tolerance on the epoch loss; `None` runs all epochs.
    pub tol: Option<f64>,
    pub n_iter_no_change: usize,
    pub seed: u64,
}

impl Default for SgdParams {
    fn default() -> Self {
        Self {
            alpha: 1e-4,
            max_iter: 1000,
            tol: Some(1e-3),
            n_iter_no_change: 5,
            seed: 42,
        }
    }
}

/// One fitted hyperplane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub epochs: usize,
}

impl Hyperplane {
    pub fn decision(&self, x: &SparseVector) -> f64 {
        x.dot(&self.weights) + self.intercept
    }
}

/// Fitted hinge-loss SGD classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdClassifier {
    classes: Vec<Category>,
    /// One hyperplane per class, or a single one for binary problems.
    planes: Vec<Hyperplane>,
}

impl SgdClassifier {
    pub fn fit(xs: &[SparseVector], ys: &[Category], params: &SgdParams) -> Result<Self> {
        let classes = check_training_set(xs, ys)?;

        let planes = if classes.len() == 2 {
            let targets = signed_targets(ys, classes[1]);
            vec![fit_binary(xs, &targets, params, params.seed)]
        } else {
            classes
                .iter()
                .enumerate()
                .map(|(i, class)| {
                    let targets = signed_targets(ys, *class);
                    fit_binary(xs, &targets, params, params.seed.wrapping_add(i as u64))
                })
                .collect()
        };

        for (i, plane) in planes.iter().enumerate() {
            debug!(model = "sgd", plane = i, epochs = plane.epochs, "hyperplane fitted");
        }

        Ok(Self { classes, planes })
    }

    /// Signed distance to each hyperplane.
    pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.planes.iter().map(|p| p.decision(x)).collect()
    }
}

impl Classifier for SgdClassifier {
    fn name(&self) -> &'static str {
        "svm"
    }

    fn classes(&self) -> &[Category] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.planes.first().map_or(0, |p| p.weights.len())
    }

    fn predict(&self, x: &SparseVector) -> Category {
        let scores = self.decision_function(x);
        if self.planes.len() == 1 {
            if scores[0] > 0.0 {
                self.classes[1]
            } else {
                self.classes[0]
            }
        } else {
            self.classes[argmax(&scores)]
        }
    }
}

fn signed_targets(ys: &[Category], positive: Category) -> Vec<f64> {
    ys.iter()
        .map(|y| if *y == positive { 1.0 } else { -1.0 })
        .collect()
}

fn hinge_loss(p: f64, y: f64) -> f64 {
    (1.0 - p * y).max(0.0)
}

fn hinge_dloss(p: f64, y: f64) -> f64 {
    if p * y <= 1.0 {
        -y
    } else {
        0.0
    }
}

fn fit_binary(xs: &[SparseVector], ys: &[f64], params: &SgdParams, seed: u64) -> Hyperplane {
    let n = xs.len();
    let dim = xs[0].dim();
    let alpha = params.alpha;

    let mut weights = vec![0.0f64; dim];
    let mut wscale = 1.0f64;
    let mut intercept = 0.0f64;

    // Heuristic initial step for the "optimal" schedule.
    let typw = (1.0 / alpha.sqrt()).sqrt();
    let eta0 = typw / hinge_dloss(-typw, 1.0).max(1.0);
    let t0 = 1.0 / (eta0 * alpha);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..n).collect();
    let mut t = 1.0f64;
    let mut best_loss = f64::INFINITY;
    let mut no_improvement = 0usize;
    let mut epochs = 0usize;

    for _ in 0..params.max_iter {
        epochs += 1;
        order.shuffle(&mut rng);
        let mut sum_loss = 0.0;

        for &i in &order {
            let x = &xs[i];
            let y = ys[i];
            let p = x.dot(&weights) * wscale + intercept;
            sum_loss += hinge_loss(p, y);

            let eta = 1.0 / (alpha * (t0 + t - 1.0));
            let update = -eta * hinge_dloss(p, y);
            if update != 0.0 {
                for (j, v) in x.iter() {
                    weights[j] += update * v / wscale;
                }
                intercept += update;
            }

            wscale *= (1.0 - eta * alpha).max(0.0);
            if wscale < MIN_WEIGHT_SCALE {
                for w in weights.iter_mut() {
                    *w *= wscale;
                }
                wscale = 1.0;
            }
            t += 1.0;
        }

        if let Some(tol) = params.tol {
            if sum_loss > best_loss - tol * n as f64 {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            if sum_loss < best_loss {
                best_loss = sum_loss;
            }
            if no_improvement >= params.n_iter_no_change {
                break;
            }
        }
    }

    for w in weights.iter_mut() {
        *w *= wscale;
    }

    Hyperplane {
        weights,
        intercept,
        epochs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_class() -> (Vec<SparseVector>, Vec<Category>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for _ in 0..5 {
            xs.push(SparseVector::from_pairs(4, vec![(0, 1.0)]));
            ys.push(Category::Ti);
            xs.push(SparseVector::from_pairs(4, vec![(1, 0.7), (3, 0.7)]));
            ys.push(Category::Finanzas);
            xs.push(SparseVector::from_pairs(4, vec![(2, 1.0)]));
            ys.push(Category::Rrhh);
        }
        (xs, ys)
    }

    #[test]
    fn separates_three_classes() {
        let (xs, ys) = three_class();
        let svm = SgdClassifier::fit(&xs, &ys, &SgdParams::default()).unwrap();
        assert_eq!(svm.predict_all(&xs), ys);
        assert_eq!(svm.planes.len(), 3);
    }

    #[test]
    fn binary_problem_uses_single_plane() {
        let xs = vec![
            SparseVector::from_pairs(2, vec![(0, 1.0)]),
            SparseVector::from_pairs(2, vec![(1, 1.0)]),
            SparseVector::from_pairs(2, vec![(0, 1.0)]),
            SparseVector::from_pairs(2, vec![(1, 1.0)]),
        ];
        let ys = vec![Category::Rrhh, Category::Ti, Category::Rrhh, Category::Ti];
        let svm = SgdClassifier::fit(&xs, &ys, &SgdParams::default()).unwrap();
        assert_eq!(svm.planes.len(), 1);
        assert_eq!(svm.predict_all(&xs), ys);
    }

    #[test]
    fn same_seed_same_model() {
        let (xs, ys) = three_class();
        let a = SgdClassifier::fit(&xs, &ys, &SgdParams::default()).unwrap();
        let b = SgdClassifier::fit(&xs, &ys, &SgdParams::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stops_early_when_loss_plateaus() {
        let (xs, ys) = three_class();
        let svm = SgdClassifier::fit(&xs, &ys, &SgdParams::default()).unwrap();
        assert!(svm.planes.iter().all(|p| p.epochs < 1000));
    }

    #[test]
    fn hinge_derivative_is_zero_beyond_margin() {
        assert_eq!(hinge_dloss(2.0, 1.0), 0.0);
        assert_eq!(hinge_dloss(0.5, 1.0), -1.0);
        assert_eq!(hinge_dloss(0.5, -1.0), 1.0);
        assert_eq!(hinge_loss(2.0, 1.0), 0.0);
    }
}
