//! Regularized linear regression on the pipeline's output arrays.
//!
//! This module provides:
//! - `RidgeRegressor`: closed-form ridge regression on standardized features
//! - `ModelArtifact`: the persisted coefficients, intercept and scaling statistics
//!
//! # Examples
//!
//! ## Fit, save, restore
//! ```rust
//! use resume_salary::RidgeRegressor;
//! use ndarray::array;
//!
//! let x = array![[0.0, 1.0], [1.0, 5.0], [0.0, 2.0]];
//! let y = array![50000.0, 150000.0, 60000.0];
//!
//! let mut model = RidgeRegressor::new().alpha(1.0);
//! model.fit(&x, &y).unwrap();
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("model.npz");
//! model.save(&path).unwrap();
//!
//! let mut restored = RidgeRegressor::new();
//! restored.load(&path).unwrap();
//! assert_eq!(restored.predict(&x).unwrap(), model.predict(&x).unwrap());
//! ```

mod artifact;
mod ridge;

pub use artifact::{ModelArtifact, DEFAULT_MODEL_PATH};
pub use ridge::RidgeRegressor;
