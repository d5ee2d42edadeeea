//! Классификатор задержек: логистическая регрессия с балансировкой классов

#![allow(non_snake_case)]

use std::sync::Arc;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{DelayError, Result};
use crate::preprocessing::encoding::N_FEATURES;

/// Порог вероятности для метки 1
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Веса классов: каждому классу - относительная частота противоположного
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassWeights {
    pub negative: f64,
    pub positive: f64,
}

impl ClassWeights {
    pub fn balanced(target: &Array1<u8>) -> Result<Self> {
        let n = target.len();
        let mut n_y0 = 0usize;
        let mut n_y1 = 0usize;
        for &label in target.iter() {
            match label {
                0 => n_y0 += 1,
                1 => n_y1 += 1,
                other => return Err(DelayError::InvalidLabel(other)),
            }
        }

        let classes = usize::from(n_y0 > 0) + usize::from(n_y1 > 0);
        if n < 2 || classes < 2 {
            return Err(DelayError::InsufficientData { rows: n, classes });
        }

        Ok(Self {
            negative: n_y1 as f64 / n as f64,
            positive: n_y0 as f64 / n as f64,
        })
    }

    pub fn weight(&self, label: u8) -> f64 {
        if label == 1 {
            self.positive
        } else {
            self.negative
        }
    }
}

/// Параметры обучения
#[derive(Debug, Clone)]
pub struct LogisticParams {
    /// Обратная сила L2-регуляризации
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub random_state: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            random_state: 42,
        }
    }
}

/// Обученная модель. После обучения не изменяется.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    coefficients: Array1<f64>,
    intercept: f64,
    threshold: f64,
    class_weights: ClassWeights,
    n_iter: usize,
}

impl LogisticModel {
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn class_weights(&self) -> ClassWeights {
        self.class_weights
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(X, self.coefficients.len())?;
        Ok((X.dot(&self.coefficients) + self.intercept).mapv(sigmoid))
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Vec<u8>> {
        let proba = self.predict_proba(X)?;
        Ok(proba
            .iter()
            .map(|&p| u8::from(p > self.threshold))
            .collect())
    }
}

enum ClassifierState {
    Untrained,
    Trained(Arc<LogisticModel>),
}

pub struct DelayClassifier {
    params: LogisticParams,
    state: ClassifierState,
}

impl DelayClassifier {
    pub fn new() -> Self {
        Self::with_params(LogisticParams::default())
    }

    pub fn with_params(params: LogisticParams) -> Self {
        Self {
            params,
            state: ClassifierState::Untrained,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ClassifierState::Trained(_))
    }

    pub fn model(&self) -> Option<Arc<LogisticModel>> {
        match &self.state {
            ClassifierState::Trained(model) => Some(Arc::clone(model)),
            ClassifierState::Untrained => None,
        }
    }

    /// Обучение на признаках и бинарной целевой переменной.
    ///
    /// Повторный вызов заменяет модель целиком.
    pub fn fit(&mut self, X: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        if X.nrows() != y.len() {
            return Err(DelayError::ShapeMismatch {
                features: X.nrows(),
                target: y.len(),
            });
        }
        check_width(X, N_FEATURES)?;

        let class_weights = ClassWeights::balanced(y)?;
        let sample_weights: Array1<f64> = y.mapv(|label| class_weights.weight(label));
        let labels: Array1<f64> = y.mapv(f64::from);

        let (beta, n_iter) = self.newton(X, &labels, &sample_weights)?;

        let n_features = X.ncols();
        let model = LogisticModel {
            coefficients: beta.slice(ndarray::s![..n_features]).to_owned(),
            intercept: beta[n_features],
            threshold: DECISION_THRESHOLD,
            class_weights,
            n_iter,
        };

        tracing::info!(
            "Delay classifier trained on {} rows in {} iterations (weights: 0 -> {:.3}, 1 -> {:.3})",
            X.nrows(),
            n_iter,
            class_weights.negative,
            class_weights.positive
        );

        self.state = ClassifierState::Trained(Arc::new(model));
        Ok(())
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Vec<u8>> {
        match &self.state {
            ClassifierState::Trained(model) => model.predict(X),
            ClassifierState::Untrained => Err(DelayError::ModelNotTrained),
        }
    }

    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        match &self.state {
            ClassifierState::Trained(model) => model.predict_proba(X),
            ClassifierState::Untrained => Err(DelayError::ModelNotTrained),
        }
    }

    /// Метод Ньютона для взвешенной логистической регрессии с L2.
    ///
    /// Последний элемент beta - свободный член, он не регуляризуется.
    fn newton(
        &self,
        X: &Array2<f64>,
        y: &Array1<f64>,
        s: &Array1<f64>,
    ) -> Result<(Array1<f64>, usize)> {
        let n_samples = X.nrows();
        let n_params = X.ncols() + 1;
        let c = self.params.c;

        // Матрица с колонкой единиц для свободного члена
        let mut Xa: Array2<f64> = Array2::ones((n_samples, n_params));
        Xa.slice_mut(ndarray::s![.., ..n_params - 1]).assign(X);

        let mut rng = StdRng::seed_from_u64(self.params.random_state);
        let mut beta: Array1<f64> = (0..n_params)
            .map(|_| rng.gen_range(-1e-3..1e-3))
            .collect();

        let mut n_iter = 0;
        let mut converged = false;
        for _ in 0..self.params.max_iter {
            n_iter += 1;
            let p = Xa.dot(&beta).mapv(sigmoid);

            // Градиент
            let residual = (&p - y) * s;
            let mut grad = Xa.t().dot(&residual) * c;
            for j in 0..n_params - 1 {
                grad[j] += beta[j];
            }

            // Гессиан
            let curvature = p.mapv(|v| v * (1.0 - v)) * s * c;
            let weighted = &Xa * &curvature.view().insert_axis(Axis(1));
            let mut hessian = Xa.t().dot(&weighted);
            for j in 0..n_params - 1 {
                hessian[[j, j]] += 1.0;
            }
            hessian[[n_params - 1, n_params - 1]] += 1e-10;

            let delta = solve_linear_system(&hessian, &grad)?;

            let Some((candidate, step)) = backtrack(&Xa, y, s, &beta, &delta, c) else {
                tracing::debug!("Newton iteration {}: no descent step, stopping", n_iter);
                converged = true;
                break;
            };
            beta = candidate;

            let max_delta = delta.iter().fold(0.0f64, |acc, d| acc.max((d * step).abs()));
            tracing::debug!("Newton iteration {}: max step {:.2e}", n_iter, max_delta);
            if max_delta < self.params.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                "Newton solver did not converge in {} iterations (tol {:.1e})",
                self.params.max_iter,
                self.params.tol
            );
        }

        Ok((beta, n_iter))
    }
}

impl Default for DelayClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn check_width(X: &Array2<f64>, expected: usize) -> Result<()> {
    if X.ncols() != expected {
        return Err(DelayError::FeatureShape {
            expected,
            got: X.ncols(),
        });
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// 0.5 * |w|^2 + C * sum(s_i * logloss_i)
fn objective(
    Xa: &Array2<f64>,
    y: &Array1<f64>,
    s: &Array1<f64>,
    beta: &Array1<f64>,
    c: f64,
) -> f64 {
    let n_params = beta.len();
    let penalty: f64 = beta.iter().take(n_params - 1).map(|b| b * b).sum::<f64>() * 0.5;

    let z = Xa.dot(beta);
    let loss: f64 = z
        .iter()
        .zip(y.iter())
        .zip(s.iter())
        .map(|((&z, &y), &s)| {
            // log(1 + e^z) без переполнения
            let softplus = z.max(0.0) + (-z.abs()).exp().ln_1p();
            s * (softplus - y * z)
        })
        .sum();

    penalty + c * loss
}

/// Дробление шага Ньютона, пока функция потерь не уменьшится.
///
/// `None`, если даже самый короткий шаг её не уменьшает.
fn backtrack(
    Xa: &Array2<f64>,
    y: &Array1<f64>,
    s: &Array1<f64>,
    beta: &Array1<f64>,
    delta: &Array1<f64>,
    c: f64,
) -> Option<(Array1<f64>, f64)> {
    let current = objective(Xa, y, s, beta, c);
    let mut step: f64 = 1.0;
    while step > 1e-4 {
        let candidate = beta - &(delta * step);
        if objective(Xa, y, s, &candidate, c) <= current {
            return Some((candidate, step));
        }
        step *= 0.5;
    }
    None
}

/// Решение A x = b методом Гаусса с выбором главного элемента
fn solve_linear_system(A: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = A.nrows();
    let mut augmented = Array2::zeros((n, n + 1));

    for i in 0..n {
        for j in 0..n {
            augmented[[i, j]] = A[[i, j]];
        }
        augmented[[i, n]] = b[i];
    }

    // Прямой ход
    for i in 0..n {
        let mut max_row = i;
        let mut max_val = augmented[[i, i]].abs();
        for k in (i + 1)..n {
            if augmented[[k, i]].abs() > max_val {
                max_val = augmented[[k, i]].abs();
                max_row = k;
            }
        }

        if max_row != i {
            for j in 0..=n {
                augmented.swap([i, j], [max_row, j]);
            }
        }

        let pivot = augmented[[i, i]];
        if pivot.abs() < 1e-12 {
            return Err(DelayError::SingularSystem);
        }

        for k in (i + 1)..n {
            let factor = augmented[[k, i]] / pivot;
            for j in i..=n {
                augmented[[k, j]] -= factor * augmented[[i, j]];
            }
        }
    }

    // Обратный ход
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = augmented[[i, n]];
        for j in (i + 1)..n {
            sum -= augmented[[i, j]] * x[j];
        }
        x[i] = sum / augmented[[i, i]];
    }

    Ok(x)
}
