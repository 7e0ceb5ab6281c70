use ndarray::Axis;

use crate::{Error, Matrix, Result, Vector};

/// Per-column standardization to zero mean and unit variance.
///
/// Statistics use the population standard deviation. Columns whose standard
/// deviation is exactly zero are divided by 1 instead.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(Error::EmptyDataset(format!(
                "cannot fit scaler on a {}x{} matrix",
                data.nrows(),
                data.ncols()
            )));
        }
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::EmptyDataset("failed to compute mean".to_string()))?;
        let std = data.std_axis(Axis(0), 0.0);

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = self
            .mean
            .as_ref()
            .zip(self.std.as_ref())
            .ok_or(Error::ModelNotFitted)?;
        standardize(data, mean, std)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn mean(&self) -> Option<&Vector> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Vector> {
        self.std.as_ref()
    }
}

/// Applies `(x - mean) / std` column-wise with the zero-variance guard.
pub(crate) fn standardize(data: &Matrix, mean: &Vector, std: &Vector) -> Result<Matrix> {
    if data.ncols() != mean.len() || data.ncols() != std.len() {
        return Err(Error::FeatureMismatch {
            expected: mean.len(),
            got: data.ncols(),
        });
    }
    let std_safe = std.mapv(|s| if s == 0.0 { 1.0 } else { s });
    Ok((data - mean) / &std_safe)
}
