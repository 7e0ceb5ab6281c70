use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::pipeline::{EventLog, Frame, StageEvent, TransformStage};
use crate::table::{Column, ColumnData, Table};
use crate::{Error, Result};

/// How missing feature values are handled.
///
/// `Mean` and `Median` fill numeric features and drop rows with missing
/// text features; `Mode` fills text features and drops rows with missing
/// numeric features; `Drop` drops both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImputeStrategy {
    #[default]
    Drop,
    Mean,
    Median,
    Mode,
}

impl FromStr for ImputeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "drop" => Ok(ImputeStrategy::Drop),
            "mean" => Ok(ImputeStrategy::Mean),
            "median" => Ok(ImputeStrategy::Median),
            "mode" => Ok(ImputeStrategy::Mode),
            other => Err(Error::InputMalformed(format!(
                "unknown imputation strategy '{other}' (expected drop, mean, median or mode)"
            ))),
        }
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImputeStrategy::Drop => "drop",
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mode => "mode",
        };
        f.write_str(name)
    }
}

/// Removes rows without a target, then fills or drops missing features.
#[derive(Clone, Debug, Default)]
pub struct MissingValuesStage {
    strategy: ImputeStrategy,
}

impl MissingValuesStage {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    fn handle(&self, table: Table, events: &mut EventLog) -> Result<Table> {
        let target = table.target_index()?;

        let keep = table.complete_rows(&[target]);
        let removed = keep.iter().filter(|k| !**k).count();
        let mut table = if removed > 0 {
            events.record(self.name(), StageEvent::MissingTargetRowsRemoved { rows: removed });
            table.filter_rows(&keep)
        } else {
            table
        };

        // Numeric columns include a numeric target; it has no gaps left.
        let numeric: Vec<usize> = (0..table.n_cols())
            .filter(|&i| table.columns()[i].is_numeric())
            .collect();
        let text: Vec<usize> = (0..table.n_cols())
            .filter(|&i| i != target && !table.columns()[i].is_numeric())
            .collect();

        match self.strategy {
            ImputeStrategy::Mean | ImputeStrategy::Median => {
                for &i in &numeric {
                    table = self.fill_numeric(table, i, events)?;
                }
            }
            _ => table = self.drop_incomplete(table, &numeric, events),
        }

        match self.strategy {
            ImputeStrategy::Mode => {
                for &i in &text {
                    table = self.fill_mode(table, i, events)?;
                }
            }
            _ => table = self.drop_incomplete(table, &text, events),
        }

        events.record(
            self.name(),
            StageEvent::Shape {
                rows: table.n_rows(),
                columns: table.n_cols(),
            },
        );
        Ok(table)
    }

    fn drop_incomplete(&self, table: Table, columns: &[usize], events: &mut EventLog) -> Table {
        let keep = table.complete_rows(columns);
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return table;
        }
        events.record(self.name(), StageEvent::IncompleteRowsRemoved { rows: removed });
        table.filter_rows(&keep)
    }

    fn fill_numeric(&self, table: Table, index: usize, events: &mut EventLog) -> Result<Table> {
        let column = &table.columns()[index];
        let values = match column.as_numeric() {
            Some(values) if values.iter().any(Option::is_none) => values,
            _ => return Ok(table),
        };

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let fill = match self.strategy {
            ImputeStrategy::Median => median(&present),
            _ => mean(&present),
        }
        .ok_or_else(|| no_values(&column.name, self.strategy))?;

        let filled = Column::numeric(
            column.name.clone(),
            values.iter().map(|v| Some(v.unwrap_or(fill))).collect(),
        );
        events.record(
            self.name(),
            StageEvent::ColumnImputed {
                column: column.name.clone(),
                fill: fill.to_string(),
            },
        );
        table.with_column(index, filled)
    }

    fn fill_mode(&self, table: Table, index: usize, events: &mut EventLog) -> Result<Table> {
        let column = &table.columns()[index];
        let values = match &column.data {
            ColumnData::Text(values) if values.iter().any(Option::is_none) => values,
            _ => return Ok(table),
        };

        let fill = mode(values.iter().flatten().map(String::as_str))
            .ok_or_else(|| no_values(&column.name, self.strategy))?
            .to_string();

        let filled = Column::text(
            column.name.clone(),
            values
                .iter()
                .map(|v| Some(v.clone().unwrap_or_else(|| fill.clone())))
                .collect(),
        );
        events.record(
            self.name(),
            StageEvent::ColumnImputed {
                column: column.name.clone(),
                fill: format!("'{fill}'"),
            },
        );
        table.with_column(index, filled)
    }
}

impl TransformStage for MissingValuesStage {
    fn name(&self) -> &'static str {
        "missing_values"
    }

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame> {
        let table = input.into_table(self.name())?;
        self.handle(table, events).map(Frame::Table)
    }
}

fn no_values(column: &str, strategy: ImputeStrategy) -> Error {
    Error::EmptyDataset(format!(
        "column '{column}' has no values to compute a {strategy} from"
    ))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    Some(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    order
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, value| {
            let count = counts[value];
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((value, count)),
            }
        })
        .map(|(value, _)| value)
}
