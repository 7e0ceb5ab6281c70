use std::path::Path;

use ndarray::{concatenate, Axis};
use tracing::debug;

use super::ModelArtifact;
use crate::linalg::{self, SingularMatrix};
use crate::preprocessing::{standardize, StandardScaler};
use crate::{Error, Matrix, Result, Vector};

/// Closed-form ridge regression on standardized features.
///
/// `fit` standardizes every column with its population mean and standard
/// deviation, optionally prepends an intercept column, and solves
/// `(XᵗX + αI) w = Xᵗy` with the intercept entry left unpenalized. When that
/// system is singular the unregularized least-squares solution is used.
#[derive(Clone, Debug)]
pub struct RidgeRegressor {
    alpha: f64,
    fit_intercept: bool,
    artifact: Option<ModelArtifact>,
}

impl RidgeRegressor {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
            artifact: None,
        }
    }

    /// Builds an already fitted regressor from stored parameters.
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Some(artifact),
            ..Self::new()
        }
    }

    /// Sets the L2 penalty.
    ///
    /// # Panics
    /// Panics if `alpha` is negative or NaN.
    pub fn alpha(mut self, alpha: f64) -> Self {
        if alpha < 0.0 || alpha.is_nan() {
            panic!("alpha must be non-negative, got {}", alpha);
        }
        self.alpha = alpha;
        self
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }

    pub fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        let (n, m) = x.dim();
        if n == 0 || m == 0 {
            return Err(Error::EmptyDataset(format!(
                "cannot fit on a {n}x{m} feature matrix"
            )));
        }
        if n != y.len() {
            return Err(Error::InputMalformed(format!(
                "feature matrix has {n} rows but target vector has {}",
                y.len()
            )));
        }

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(x)?;
        let design = if self.fit_intercept {
            concatenate(Axis(1), &[Matrix::ones((n, 1)).view(), scaled.view()])
                .map_err(|e| Error::InputMalformed(e.to_string()))?
        } else {
            scaled
        };

        let weights = match self.solve_ridge_equation(&design, y) {
            Ok(weights) => weights,
            Err(SingularMatrix) => {
                debug!("regularized system is singular, falling back to least squares");
                linalg::lstsq(&design, y)
            }
        };

        let (intercept, coefficients) = if self.fit_intercept {
            (weights[0], weights.slice(ndarray::s![1..]).to_owned())
        } else {
            (0.0, weights)
        };

        let (mean, std) = match (scaler.mean(), scaler.std()) {
            (Some(mean), Some(std)) => (mean.clone(), std.clone()),
            _ => return Err(Error::ModelNotFitted),
        };

        debug!(n_samples = n, n_features = m, intercept, "ridge model fitted");
        self.artifact = Some(ModelArtifact {
            coefficients,
            intercept,
            mean,
            std,
        });
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vector> {
        let artifact = self.artifact.as_ref().ok_or(Error::ModelNotFitted)?;

        if x.ncols() != artifact.n_features() {
            return Err(Error::FeatureMismatch {
                expected: artifact.n_features(),
                got: x.ncols(),
            });
        }

        let scaled = standardize(x, &artifact.mean, &artifact.std)?;
        Ok(scaled.dot(&artifact.coefficients) + artifact.intercept)
    }

    /// Coefficient of determination of the predictions on `x` against `y`.
    pub fn score(&self, x: &Matrix, y: &Vector) -> Result<f64> {
        let y_pred = self.predict(x)?;
        crate::metrics::r2_score(y, &y_pred)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.artifact
            .as_ref()
            .ok_or(Error::ModelNotFitted)?
            .save(path)
    }

    /// Replaces the current parameters with the ones stored at `path`.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.artifact = Some(ModelArtifact::load(path)?);
        Ok(())
    }

    fn solve_ridge_equation(
        &self,
        design: &Matrix,
        y: &Vector,
    ) -> std::result::Result<Vector, SingularMatrix> {
        let mut regularized = design.t().dot(design);
        for i in 0..regularized.nrows() {
            if !(self.fit_intercept && i == 0) {
                regularized[(i, i)] += self.alpha;
            }
        }

        let xty = design.t().dot(y);
        linalg::solve(&regularized, &xty)
    }
}

impl Default for RidgeRegressor {
    fn default() -> Self {
        Self::new()
    }
}
