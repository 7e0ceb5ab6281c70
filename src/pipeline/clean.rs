use std::collections::HashSet;

use crate::pipeline::{EventLog, Frame, StageEvent, TransformStage};
use crate::table::Table;
use crate::Result;

/// Name given to an unnamed leading column, i.e. a saved positional index.
pub const INDEX_COLUMN: &str = "Unnamed: 0";

/// Drops the positional index column and exact duplicate rows.
#[derive(Clone, Debug, Default)]
pub struct CleanStage;

impl CleanStage {
    fn clean(&self, table: Table, events: &mut EventLog) -> Table {
        let table = if table.column(INDEX_COLUMN).is_some() {
            events.record(
                self.name(),
                StageEvent::IndexColumnDropped {
                    column: INDEX_COLUMN.to_string(),
                },
            );
            table.without_column(INDEX_COLUMN)
        } else {
            table
        };

        let keep = {
            let mut seen = HashSet::with_capacity(table.n_rows());
            (0..table.n_rows())
                .map(|row| seen.insert(table.row_key(row)))
                .collect::<Vec<bool>>()
        };
        let removed = keep.iter().filter(|k| !**k).count();

        let table = if removed > 0 {
            events.record(self.name(), StageEvent::DuplicatesRemoved { rows: removed });
            table.filter_rows(&keep)
        } else {
            table
        };

        events.record(
            self.name(),
            StageEvent::Shape {
                rows: table.n_rows(),
                columns: table.n_cols(),
            },
        );
        table
    }
}

impl TransformStage for CleanStage {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn process(&self, input: Frame, events: &mut EventLog) -> Result<Frame> {
        let table = input.into_table(self.name())?;
        Ok(Frame::Table(self.clean(table, events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn run(table: Table) -> (Table, EventLog) {
        let mut events = EventLog::new();
        let out = CleanStage
            .process(table.into(), &mut events)
            .unwrap()
            .into_table("test")
            .unwrap();
        (out, events)
    }

    #[test]
    fn test_removes_exact_duplicates_keeping_first() {
        let table = Table::new(vec![
            Column::from_strs("level", &["junior", "junior", "senior", "junior"]),
            Column::from_f64("years", &[1.0, 1.0, 5.0, 2.0]),
            Column::from_f64("salary", &[50000.0, 50000.0, 150000.0, 50000.0]),
        ])
        .unwrap();

        let (out, events) = run(table);
        assert_eq!(out.n_rows(), 3);
        assert_eq!(
            out.column("years").unwrap().as_numeric().unwrap(),
            &[Some(1.0), Some(5.0), Some(2.0)]
        );
        assert!(events
            .events_of("clean")
            .any(|e| *e == StageEvent::DuplicatesRemoved { rows: 1 }));
    }

    #[test]
    fn test_missing_cells_compare_equal() {
        let table = Table::new(vec![
            Column::numeric("years", vec![None, None]),
            Column::from_f64("salary", &[1.0, 1.0]),
        ])
        .unwrap();
        let (out, _) = run(table);
        assert_eq!(out.n_rows(), 1);
    }

    #[test]
    fn test_drops_index_column() {
        let table = Table::new(vec![
            Column::from_f64(INDEX_COLUMN, &[0.0, 1.0]),
            Column::from_f64("salary", &[10.0, 10.0]),
        ])
        .unwrap();

        // Rows differ only in their index, so they become duplicates once it is gone.
        let (out, events) = run(table);
        assert_eq!(out.column_names(), vec!["salary"]);
        assert_eq!(out.n_rows(), 1);
        assert_eq!(
            events.records()[0].event,
            StageEvent::IndexColumnDropped {
                column: INDEX_COLUMN.to_string()
            }
        );
    }

    #[test]
    fn test_idempotent() {
        let table = Table::new(vec![
            Column::text(
                "city",
                vec![Some("Moscow".into()), None, Some("Moscow".into()), None],
            ),
            Column::numeric("salary", vec![Some(1.0), Some(2.0), Some(1.0), Some(2.0)]),
        ])
        .unwrap();

        let (once, _) = run(table);
        let (twice, events) = run(once.clone());
        assert_eq!(once, twice);
        assert!(!events
            .events_of("clean")
            .any(|e| matches!(e, StageEvent::DuplicatesRemoved { .. })));
    }

    #[test]
    fn test_empty_table() {
        let (out, _) = run(Table::default());
        assert_eq!(out.n_rows(), 0);

        let header_only = Table::new(vec![Column::numeric("salary", vec![])]).unwrap();
        let (out, _) = run(header_only);
        assert_eq!(out.n_rows(), 0);
        assert_eq!(out.n_cols(), 1);
    }
}
