//! In-memory tabular data.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. The
//! last column is the prediction target; every other column is a candidate
//! feature. Row positions are implicit and shared by all columns, so any
//! row filter is applied to every column at once.

mod column;
mod reader;

pub use column::{Column, ColumnData};
pub(crate) use column::CellKey;
pub use reader::{read_csv, MISSING_MARKERS};

use crate::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n_rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
                return Err(Error::InputMalformed(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    n_rows
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The designated target: always the last column.
    pub fn target(&self) -> Option<&Column> {
        self.columns.last()
    }

    /// Index of the target column, failing on a table without columns.
    pub fn target_index(&self) -> Result<usize> {
        self.columns
            .len()
            .checked_sub(1)
            .ok_or_else(|| Error::EmptyDataset("table has no columns".to_string()))
    }

    pub fn without_column(self, name: &str) -> Table {
        Table {
            columns: self
                .columns
                .into_iter()
                .filter(|c| c.name != name)
                .collect(),
        }
    }

    /// Returns a copy of the table with the column at `index` replaced.
    pub fn with_column(&self, index: usize, column: Column) -> Result<Table> {
        if column.len() != self.n_rows() {
            return Err(Error::InputMalformed(format!(
                "replacement column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.n_rows()
            )));
        }
        let mut columns = self.columns.clone();
        columns[index] = column;
        Ok(Table { columns })
    }

    /// Keeps the rows whose mask entry is `true`.
    pub fn filter_rows(&self, keep: &[bool]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.filter_rows(keep)).collect(),
        }
    }

    /// Mask selecting rows where none of the given columns is missing.
    pub fn complete_rows(&self, column_indices: &[usize]) -> Vec<bool> {
        (0..self.n_rows())
            .map(|row| {
                column_indices
                    .iter()
                    .all(|&idx| !self.columns[idx].is_missing(row))
            })
            .collect()
    }

    pub(crate) fn row_key(&self, row: usize) -> Vec<CellKey<'_>> {
        self.columns.iter().map(|c| c.cell_key(row)).collect()
    }
}
