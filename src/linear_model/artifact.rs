use std::fmt::Display;
use std::fs::{self, File};
use std::path::Path;

use ndarray::{arr0, ArrayD, Ix1};
use ndarray_npy::{NpzReader, NpzWriter};
use tempfile::NamedTempFile;

use crate::{Error, Result, Vector};

/// Default location of the trained model, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "resources/model.npz";

const COEF: &str = "coef";
const INTERCEPT: &str = "intercept";
const MEAN: &str = "mean";
const STD: &str = "std";

/// Everything needed to reproduce predictions without retraining.
///
/// Stored as a NumPy `.npz` archive with the arrays `coef`, `intercept`
/// (zero-dimensional), `mean` and `std`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelArtifact {
    pub coefficients: Vector,
    pub intercept: f64,
    pub mean: Vector,
    pub std: Vector,
}

impl ModelArtifact {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Writes the artifact, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut npz = NpzWriter::new(tmp.as_file_mut());
            npz.add_array(COEF, &self.coefficients)
                .map_err(|e| persist_error(path, e))?;
            npz.add_array(INTERCEPT, &arr0(self.intercept))
                .map_err(|e| persist_error(path, e))?;
            npz.add_array(MEAN, &self.mean)
                .map_err(|e| persist_error(path, e))?;
            npz.add_array(STD, &self.std)
                .map_err(|e| persist_error(path, e))?;
            npz.finish().map_err(|e| persist_error(path, e))?;
        }
        tmp.persist(path).map_err(|e| persist_error(path, e))?;
        Ok(())
    }

    /// Reads an artifact written by [`ModelArtifact::save`] (or `numpy.savez`).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelFileMissing(path.to_path_buf()));
        }
        let mut npz = NpzReader::new(File::open(path)?).map_err(|e| malformed(path, e))?;
        let mut read = |name: &str| -> Result<ArrayD<f64>> {
            npz.by_name(&format!("{name}.npy"))
                .map_err(|e| malformed(path, format!("array '{name}': {e}")))
        };

        let coefficients = to_vector(read(COEF)?, COEF, path)?;
        let intercept = read(INTERCEPT)?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| malformed(path, "array 'intercept' is empty"))?;
        let mean = to_vector(read(MEAN)?, MEAN, path)?;
        let std = to_vector(read(STD)?, STD, path)?;

        if mean.len() != coefficients.len() || std.len() != coefficients.len() {
            return Err(malformed(
                path,
                format!(
                    "coef, mean and std lengths differ ({}, {}, {})",
                    coefficients.len(),
                    mean.len(),
                    std.len()
                ),
            ));
        }

        Ok(Self {
            coefficients,
            intercept,
            mean,
            std,
        })
    }
}

fn to_vector(array: ArrayD<f64>, name: &str, path: &Path) -> Result<Vector> {
    array
        .into_dimensionality::<Ix1>()
        .map_err(|_| malformed(path, format!("array '{name}' must be 1-dimensional")))
}

fn malformed(path: &Path, err: impl Display) -> Error {
    Error::InputMalformed(format!("{}: {err}", path.display()))
}

fn persist_error(path: &Path, err: impl Display) -> Error {
    Error::Persist {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            coefficients: array![1.5, -2.25],
            intercept: 98000.0,
            mean: array![0.5, 3.0],
            std: array![0.5, 0.0],
        }
    }

    #[test]
    fn test_save_then_load_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources").join("model.npz");

        artifact().save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact());
        assert_eq!(loaded.n_features(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.npz");
        assert!(matches!(
            ModelArtifact::load(&path),
            Err(Error::ModelFileMissing(p)) if p == path
        ));
    }

    #[test]
    fn test_load_rejects_inconsistent_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.npz");
        let mut broken = artifact();
        broken.std = array![1.0];
        broken.save(&path).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(Error::InputMalformed(_))
        ));
    }

    #[test]
    fn test_load_rejects_non_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.npz");
        fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(Error::InputMalformed(_))
        ));
    }
}
