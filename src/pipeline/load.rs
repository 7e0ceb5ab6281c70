use crate::pipeline::{EventLog, Frame, StageEvent, TransformStage};
use crate::table::read_csv;
use crate::Result;

/// Reads the input file; an already materialized table passes through.
#[derive(Clone, Debug, Default)]
pub struct LoadStage;

impl TransformStage for LoadStage {
    fn name(&self) -> &'static str {
        "load"
    }

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame> {
        match input {
            Frame::Source(path) => {
                let table = read_csv(&path)?;
                events.record(
                    self.name(),
                    StageEvent::Loaded {
                        rows: table.n_rows(),
                        columns: table.n_cols(),
                    },
                );
                Ok(Frame::Table(table))
            }
            other => Ok(other),
        }
    }
}
