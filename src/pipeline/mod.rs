//! The table preparation pipeline.
//!
//! A [`Pipeline`] owns a fixed, ordered list of [`TransformStage`]s and runs
//! every one of them on each input, feeding stage *i*'s output to stage
//! *i + 1*. The first failing stage aborts the run; nothing downstream of it
//! executes and no output files are written.
//!
//! The default stage order:
//! 1. [`LoadStage`] reads the delimited file
//! 2. [`CleanStage`] drops the index column and duplicate rows
//! 3. [`MissingValuesStage`] removes rows without a target, then imputes or drops
//! 4. [`EncodeStage`] turns text features into integer codes
//! 5. [`FeatureEngineeringStage`] (identity)
//! 6. [`SplitStage`] separates the target from the feature matrix
//! 7. [`PersistStage`] writes `x_data.npy` and `y_data.npy`
//!
//! # Examples
//!
//! ```rust
//! use resume_salary::pipeline::{ImputeStrategy, Pipeline};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let csv = dir.path().join("hh.csv");
//! std::fs::write(&csv, ",level,years,salary\n0,junior,1,50000\n1,senior,5,150000\n2,junior,,60000\n").unwrap();
//!
//! let pipeline = Pipeline::with_strategy(dir.path(), ImputeStrategy::Mean);
//! let run = pipeline.run(csv.as_path()).unwrap();
//!
//! let dataset = run.output.into_dataset("example").unwrap();
//! assert_eq!(dataset.features.dim(), (3, 2));
//! assert_eq!(dataset.features[[2, 1]], 3.0);
//! assert!(dir.path().join("x_data.npy").is_file());
//! ```

mod clean;
mod encode;
mod features;
mod load;
mod missing;
mod persist;
mod split;
mod stage;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dataset::Dataset;
use crate::Result;

pub use clean::{CleanStage, INDEX_COLUMN};
pub use encode::EncodeStage;
pub use features::FeatureEngineeringStage;
pub use load::LoadStage;
pub use missing::{ImputeStrategy, MissingValuesStage};
pub use persist::PersistStage;
pub use split::SplitStage;
pub use stage::{EventLog, Frame, StageEvent, StageRecord, TransformStage};

/// Output of a pipeline run together with what each stage reported.
#[derive(Debug)]
pub struct PipelineRun {
    pub output: Frame,
    pub events: EventLog,
}

pub struct Pipeline {
    stages: Vec<Box<dyn TransformStage>>,
}

impl Pipeline {
    /// The seven standard stages, dropping incomplete rows.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_strategy(output_dir, ImputeStrategy::default())
    }

    pub fn with_strategy(output_dir: impl Into<PathBuf>, strategy: ImputeStrategy) -> Self {
        Self::from_stages(vec![
            Box::new(LoadStage),
            Box::new(CleanStage),
            Box::new(MissingValuesStage::new(strategy)),
            Box::new(EncodeStage),
            Box::new(FeatureEngineeringStage),
            Box::new(SplitStage),
            Box::new(PersistStage::new(output_dir)),
        ])
    }

    pub fn from_stages(stages: Vec<Box<dyn TransformStage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in order on `input`.
    pub fn run(&self, input: impl Into<Frame>) -> Result<PipelineRun> {
        let mut events = EventLog::new();
        let mut frame = input.into();

        for stage in &self.stages {
            debug!(stage = stage.name(), input = frame.kind(), "running stage");
            frame = stage.process(frame, &mut events)?;
        }

        Ok(PipelineRun {
            output: frame,
            events,
        })
    }

    /// Runs the pipeline on a file, returning the feature/target pair.
    pub fn process(&self, path: &Path) -> Result<(Dataset, EventLog)> {
        let run = self.run(path)?;
        let dataset = run.output.into_dataset("pipeline")?;
        Ok((dataset, run.events))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
