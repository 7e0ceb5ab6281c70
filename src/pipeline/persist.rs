use std::path::{Path, PathBuf};

use crate::pipeline::{EventLog, Frame, StageEvent, TransformStage};
use crate::Result;

/// Writes the feature/target pair as `x_data.npy` and `y_data.npy`.
#[derive(Clone, Debug)]
pub struct PersistStage {
    output_dir: PathBuf,
}

impl PersistStage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl TransformStage for PersistStage {
    fn name(&self) -> &'static str {
        "persist"
    }

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame> {
        let dataset = input.into_dataset(self.name())?;
        let (x_path, y_path) = dataset.save(&self.output_dir)?;
        events.record(self.name(), StageEvent::Saved { x_path, y_path });
        Ok(Frame::Dataset(dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, X_DATA_FILE, Y_DATA_FILE};
    use crate::table::{Column, Table};
    use crate::Error;
    use ndarray::array;

    #[test]
    fn test_writes_both_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("resources");
        let dataset = Dataset::new(array![[1.0], [2.0]], array![3.0, 4.0]).unwrap();

        let mut events = EventLog::new();
        let out = PersistStage::new(&out_dir)
            .process(dataset.clone().into(), &mut events)
            .unwrap();

        assert_eq!(out, Frame::Dataset(dataset.clone()));
        assert!(out_dir.join(X_DATA_FILE).is_file());
        assert!(out_dir.join(Y_DATA_FILE).is_file());
        assert_eq!(Dataset::load(&out_dir).unwrap(), dataset);
        assert_eq!(
            events.records()[0].event,
            StageEvent::Saved {
                x_path: out_dir.join(X_DATA_FILE),
                y_path: out_dir.join(Y_DATA_FILE),
            }
        );
    }

    #[test]
    fn test_requires_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::new(vec![Column::from_f64("salary", &[1.0])]).unwrap();
        let result = PersistStage::new(dir.path()).process(table.into(), &mut EventLog::new());
        assert!(matches!(result, Err(Error::UnexpectedFrame { stage: "persist", .. })));
        assert!(!dir.path().join(X_DATA_FILE).exists());
    }
}
