pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod dataset;
pub mod error;
mod linalg;
pub mod linear_model;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod table;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use linear_model::{ModelArtifact, RidgeRegressor};
pub use pipeline::{ImputeStrategy, Pipeline};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
