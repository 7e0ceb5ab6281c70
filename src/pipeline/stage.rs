use std::fmt;
use std::path::{Path, PathBuf};

use crate::dataset::Dataset;
use crate::table::Table;
use crate::{Error, Result};

/// Payload handed from one stage to the next.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Path of a delimited file not read yet.
    Source(PathBuf),
    Table(Table),
    Dataset(Dataset),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Source(_) => "a file path",
            Frame::Table(_) => "a table",
            Frame::Dataset(_) => "a feature/target pair",
        }
    }

    pub fn into_table(self, stage: &'static str) -> Result<Table> {
        match self {
            Frame::Table(table) => Ok(table),
            other => Err(unexpected(stage, "a table", &other)),
        }
    }

    pub fn into_dataset(self, stage: &'static str) -> Result<Dataset> {
        match self {
            Frame::Dataset(dataset) => Ok(dataset),
            other => Err(unexpected(stage, "a feature/target pair", &other)),
        }
    }
}

pub(crate) fn unexpected(stage: &'static str, expected: &'static str, found: &Frame) -> Error {
    Error::UnexpectedFrame {
        stage,
        expected,
        found: found.kind(),
    }
}

impl From<Table> for Frame {
    fn from(table: Table) -> Self {
        Frame::Table(table)
    }
}

impl From<Dataset> for Frame {
    fn from(dataset: Dataset) -> Self {
        Frame::Dataset(dataset)
    }
}

impl From<PathBuf> for Frame {
    fn from(path: PathBuf) -> Self {
        Frame::Source(path)
    }
}

impl From<&Path> for Frame {
    fn from(path: &Path) -> Self {
        Frame::Source(path.to_path_buf())
    }
}

/// Something a stage did, reported back to the caller instead of logged.
#[derive(Clone, Debug, PartialEq)]
pub enum StageEvent {
    Loaded { rows: usize, columns: usize },
    IndexColumnDropped { column: String },
    DuplicatesRemoved { rows: usize },
    MissingTargetRowsRemoved { rows: usize },
    ColumnImputed { column: String, fill: String },
    IncompleteRowsRemoved { rows: usize },
    ColumnEncoded { column: String, categories: usize },
    TargetEncoded { column: String, categories: usize },
    Shape { rows: usize, columns: usize },
    Split { rows: usize, features: usize },
    Saved { x_path: PathBuf, y_path: PathBuf },
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageEvent::Loaded { rows, columns } => {
                write!(f, "loaded {} rows, {} columns", rows, columns)
            }
            StageEvent::IndexColumnDropped { column } => {
                write!(f, "dropped index column '{}'", column)
            }
            StageEvent::DuplicatesRemoved { rows } => write!(f, "removed {} duplicate rows", rows),
            StageEvent::MissingTargetRowsRemoved { rows } => {
                write!(f, "removed {} rows with a missing target", rows)
            }
            StageEvent::ColumnImputed { column, fill } => {
                write!(f, "filled missing values of '{}' with {}", column, fill)
            }
            StageEvent::IncompleteRowsRemoved { rows } => {
                write!(f, "removed {} rows with missing features", rows)
            }
            StageEvent::ColumnEncoded { column, categories } => {
                write!(f, "encoded '{}' ({} categories)", column, categories)
            }
            StageEvent::TargetEncoded { column, categories } => {
                write!(f, "encoded target '{}' ({} categories)", column, categories)
            }
            StageEvent::Shape { rows, columns } => {
                write!(f, "{} rows, {} columns", rows, columns)
            }
            StageEvent::Split { rows, features } => {
                write!(f, "X shape ({}, {}), y shape ({},)", rows, features, rows)
            }
            StageEvent::Saved { x_path, y_path } => {
                write!(f, "saved {} and {}", x_path.display(), y_path.display())
            }
        }
    }
}

/// One reported event together with the stage that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct StageRecord {
    pub stage: &'static str,
    pub event: StageEvent,
}

/// Events collected while a pipeline runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventLog {
    records: Vec<StageRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &'static str, event: StageEvent) {
        self.records.push(StageRecord { stage, event });
    }

    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    pub fn events_of(&self, stage: &str) -> impl Iterator<Item = &StageEvent> {
        self.records
            .iter()
            .filter(move |r| r.stage == stage)
            .map(|r| &r.event)
    }

    pub fn into_records(self) -> Vec<StageRecord> {
        self.records
    }
}

/// One step of the table pipeline.
///
/// `process` must depend only on its input and the stage's own
/// construction-time configuration. It takes the frame by value and returns
/// a new one; nothing else holds a reference to the frame in between.
pub trait TransformStage {
    fn name(&self) -> &'static str;

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame>;
}
