use std::collections::HashMap;

use crate::pipeline::{EventLog, Frame, StageEvent, TransformStage};
use crate::table::{Column, ColumnData, Table};
use crate::Result;

/// Replaces every text feature column with integer category codes.
///
/// Codes are assigned per run in order of first appearance, starting at 0.
/// A missing cell that survived imputation is its own category. The target
/// column is left for the split stage.
#[derive(Clone, Debug, Default)]
pub struct EncodeStage;

impl EncodeStage {
    fn encode(&self, table: Table, events: &mut EventLog) -> Result<Table> {
        let target = table.target_index()?;
        let mut columns = table.into_columns();

        for column in columns.iter_mut().take(target) {
            let (codes, n_categories) = match &column.data {
                ColumnData::Text(values) => {
                    let (codes, categories) = factorize(values);
                    (codes, categories.len())
                }
                ColumnData::Numeric(_) => continue,
            };
            events.record(
                self.name(),
                StageEvent::ColumnEncoded {
                    column: column.name.clone(),
                    categories: n_categories,
                },
            );
            *column = Column::numeric(
                std::mem::take(&mut column.name),
                codes.into_iter().map(Some).collect(),
            );
        }

        let table = Table::new(columns)?;
        events.record(
            self.name(),
            StageEvent::Shape {
                rows: table.n_rows(),
                columns: table.n_cols(),
            },
        );
        Ok(table)
    }
}

impl TransformStage for EncodeStage {
    fn name(&self) -> &'static str {
        "encode"
    }

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame> {
        let table = input.into_table(self.name())?;
        self.encode(table, events).map(Frame::Table)
    }
}

/// Integer codes for `values` and the distinct categories in code order.
pub(crate) fn factorize(values: &[Option<String>]) -> (Vec<f64>, Vec<Option<&str>>) {
    let mut categories: Vec<Option<&str>> = Vec::new();
    let mut codes_by_value: HashMap<Option<&str>, usize> = HashMap::new();
    let codes = values
        .iter()
        .map(|value| {
            let value = value.as_deref();
            let code = *codes_by_value.entry(value).or_insert_with(|| {
                categories.push(value);
                categories.len() - 1
            });
            code as f64
        })
        .collect();
    (codes, categories)
}
