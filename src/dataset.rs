use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, Ix1, Ix2};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::{Error, Matrix, Result, Vector};

/// File name of the persisted feature matrix.
pub const X_DATA_FILE: &str = "x_data.npy";
/// File name of the persisted target vector.
pub const Y_DATA_FILE: &str = "y_data.npy";

/// A row-aligned feature matrix and target vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub features: Matrix,
    pub targets: Vector,
}

impl Dataset {
    pub fn new(features: Matrix, targets: Vector) -> Result<Self> {
        if features.nrows() != targets.len() {
            return Err(Error::InputMalformed(format!(
                "feature matrix has {} rows but target vector has {}",
                features.nrows(),
                targets.len()
            )));
        }

        Ok(Self { features, targets })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Writes `x_data.npy` and `y_data.npy` into `dir`, creating it if needed.
    ///
    /// Both arrays are first written to temporary files inside `dir` and only
    /// moved into place once both writes succeeded. If moving `y_data.npy`
    /// fails, `x_data.npy` is rolled back to what was there before.
    pub fn save(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)?;
        let x_path = dir.join(X_DATA_FILE);
        let y_path = dir.join(Y_DATA_FILE);

        let mut x_tmp = NamedTempFile::new_in(dir)?;
        self.features
            .write_npy(x_tmp.as_file_mut())
            .map_err(|e| persist_error(&x_path, e))?;
        let mut y_tmp = NamedTempFile::new_in(dir)?;
        self.targets
            .write_npy(y_tmp.as_file_mut())
            .map_err(|e| persist_error(&y_path, e))?;

        // An existing x_data.npy is set aside so a failed second rename can
        // put it back; the pair on disk never mixes old and new arrays.
        let backup = if x_path.exists() {
            let backup = NamedTempFile::new_in(dir)?;
            fs::rename(&x_path, backup.path())?;
            Some(backup)
        } else {
            None
        };

        if let Err(e) = x_tmp.persist(&x_path) {
            restore(&x_path, backup.as_ref());
            return Err(persist_error(&x_path, e));
        }
        if let Err(e) = y_tmp.persist(&y_path) {
            restore(&x_path, backup.as_ref());
            return Err(persist_error(&y_path, e));
        }

        Ok((x_path, y_path))
    }

    /// Loads `x_data.npy` and `y_data.npy` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_from(&dir.join(X_DATA_FILE), &dir.join(Y_DATA_FILE))
    }

    pub fn load_from(x_path: &Path, y_path: &Path) -> Result<Self> {
        let features = read_matrix(x_path)?;
        let targets = read_vector(y_path)?;
        Self::new(features, targets)
    }
}

/// Reads a 2-dimensional `f64` array from a `.npy` file.
pub fn read_matrix(path: &Path) -> Result<Matrix> {
    read_array(path)?
        .into_dimensionality::<Ix2>()
        .map_err(|_| dimension_error(path, 2))
}

/// Reads a 1-dimensional `f64` array from a `.npy` file.
pub fn read_vector(path: &Path) -> Result<Vector> {
    read_array(path)?
        .into_dimensionality::<Ix1>()
        .map_err(|_| dimension_error(path, 1))
}

fn read_array(path: &Path) -> Result<ArrayD<f64>> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    ArrayD::<f64>::read_npy(reader)
        .map_err(|e| Error::InputMalformed(format!("{}: {e}", path.display())))
}

fn restore(x_path: &Path, backup: Option<&NamedTempFile>) {
    let result = match backup {
        Some(backup) => fs::rename(backup.path(), x_path),
        None => fs::remove_file(x_path),
    };
    if let Err(e) = result {
        warn!("could not roll back {}: {e}", x_path.display());
    }
}

fn dimension_error(path: &Path, expected: usize) -> Error {
    Error::InputMalformed(format!(
        "{}: expected a {expected}-dimensional array",
        path.display()
    ))
}

fn persist_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Persist {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_dataset_creation() {
        let features = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let targets = array![1.0, 2.0, 3.0];

        let dataset = Dataset::new(features, targets).unwrap();
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 2);
    }

    #[test]
    fn test_row_mismatch() {
        let features = array![[1.0], [2.0]];
        let targets = array![1.0, 2.0, 3.0];
        assert!(matches!(
            Dataset::new(features, targets),
            Err(Error::InputMalformed(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let dataset = Dataset::new(array![[0.0, 1.0], [1.0, 5.0]], array![50000.0, 150000.0]).unwrap();

        let (x_path, y_path) = dataset.save(&out).unwrap();
        assert_eq!(x_path, out.join(X_DATA_FILE));
        assert_eq!(y_path, out.join(Y_DATA_FILE));

        let loaded = Dataset::load(&out).unwrap();
        assert_eq!(loaded, dataset);

        let leftovers = fs::read_dir(&out).unwrap().count();
        assert_eq!(leftovers, 2);
    }

    #[test]
    fn test_failed_target_write_restores_previous_features() {
        let dir = tempfile::tempdir().unwrap();
        let old = Dataset::new(array![[1.0], [2.0]], array![10.0, 20.0]).unwrap();
        old.save(dir.path()).unwrap();

        // A non-empty directory where y_data.npy should go makes the rename fail.
        fs::remove_file(dir.path().join(Y_DATA_FILE)).unwrap();
        fs::create_dir(dir.path().join(Y_DATA_FILE)).unwrap();
        fs::write(dir.path().join(Y_DATA_FILE).join("keep"), b"").unwrap();

        let new = Dataset::new(array![[7.0], [8.0], [9.0]], array![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(new.save(dir.path()), Err(Error::Persist { .. })));

        let features = read_matrix(&dir.path().join(X_DATA_FILE)).unwrap();
        assert_eq!(features, old.features);
    }

    #[test]
    fn test_failed_target_write_leaves_no_features() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(Y_DATA_FILE)).unwrap();
        fs::write(dir.path().join(Y_DATA_FILE).join("keep"), b"").unwrap();

        let dataset = Dataset::new(array![[1.0]], array![2.0]).unwrap();
        assert!(dataset.save(dir.path()).is_err());
        assert!(!dir.path().join(X_DATA_FILE).exists());
    }

    #[test]
    fn test_load_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Dataset::load(dir.path()),
            Err(Error::InputNotFound(_))
        ));
    }

    #[test]
    fn test_wrong_dimensionality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.npy");
        ndarray_npy::write_npy(&path, &Array3::<f64>::zeros((2, 2, 2))).unwrap();

        assert!(matches!(read_matrix(&path), Err(Error::InputMalformed(_))));
        assert!(matches!(read_vector(&path), Err(Error::InputMalformed(_))));
    }
}
