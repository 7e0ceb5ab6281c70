use ndarray::Array2;

use crate::dataset::Dataset;
use crate::pipeline::encode::factorize;
use crate::pipeline::{EventLog, Frame, StageEvent, TransformStage};
use crate::table::{Column, ColumnData, Table};
use crate::{Error, Result, Vector};

/// Separates the last column as target and packs the rest into a matrix.
///
/// A text target is encoded the same way feature columns are. Feature
/// columns must be numeric and complete by the time they get here.
#[derive(Clone, Debug, Default)]
pub struct SplitStage;

impl SplitStage {
    fn split(&self, table: Table, events: &mut EventLog) -> Result<Dataset> {
        let mut columns = table.into_columns();
        let Some(target) = columns.pop() else {
            return Err(Error::EmptyDataset("table has no columns".to_string()));
        };

        let targets = self.target_vector(&target, events)?;
        let n_rows = targets.len();
        let n_features = columns.len();

        let mut cells = Vec::with_capacity(n_rows * n_features);
        for row in 0..n_rows {
            for column in &columns {
                cells.push(feature_cell(column, row)?);
            }
        }
        let features = Array2::from_shape_vec((n_rows, n_features), cells)
            .map_err(|e| Error::InputMalformed(e.to_string()))?;

        let dataset = Dataset::new(features, targets)?;
        events.record(
            self.name(),
            StageEvent::Split {
                rows: dataset.n_samples(),
                features: dataset.n_features(),
            },
        );
        Ok(dataset)
    }

    fn target_vector(&self, target: &Column, events: &mut EventLog) -> Result<Vector> {
        match &target.data {
            ColumnData::Numeric(values) => values
                .iter()
                .map(|v| match v {
                    Some(value) if value.is_finite() => Ok(*value),
                    _ => Err(Error::InputMalformed(format!(
                        "target '{}' has missing or non-finite values",
                        target.name
                    ))),
                })
                .collect(),
            ColumnData::Text(values) => {
                if values.iter().any(Option::is_none) {
                    return Err(Error::InputMalformed(format!(
                        "target '{}' has missing values",
                        target.name
                    )));
                }
                let (codes, categories) = factorize(values);
                events.record(
                    self.name(),
                    StageEvent::TargetEncoded {
                        column: target.name.clone(),
                        categories: categories.len(),
                    },
                );
                Ok(Vector::from(codes))
            }
        }
    }
}

impl TransformStage for SplitStage {
    fn name(&self) -> &'static str {
        "split"
    }

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame> {
        let table = input.into_table(self.name())?;
        self.split(table, events).map(Frame::Dataset)
    }
}

fn feature_cell(column: &Column, row: usize) -> Result<f64> {
    match &column.data {
        ColumnData::Numeric(values) => match values[row] {
            Some(value) if value.is_finite() => Ok(value),
            Some(value) => Err(Error::InputMalformed(format!(
                "feature '{}' has the non-finite value {} in row {}",
                column.name, value, row
            ))),
            None => Err(Error::InputMalformed(format!(
                "feature '{}' has a missing value in row {}",
                column.name, row
            ))),
        },
        ColumnData::Text(_) => Err(Error::InputMalformed(format!(
            "feature '{}' is not numeric",
            column.name
        ))),
    }
}
