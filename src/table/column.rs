/// Cell storage of a single column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// A named column; `None` cells are missing values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Convenience constructor for fully populated numeric columns.
    pub fn from_f64(name: impl Into<String>, values: &[f64]) -> Self {
        Self::numeric(name, values.iter().copied().map(Some).collect())
    }

    /// Convenience constructor for fully populated text columns.
    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        Self::text(name, values.iter().map(|v| Some(v.to_string())).collect())
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.data {
            ColumnData::Numeric(values) => values[row].is_none(),
            ColumnData::Text(values) => values[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(values) => Some(values),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Keeps the rows whose mask entry is `true`, in order.
    pub fn filter_rows(&self, keep: &[bool]) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(values) => ColumnData::Numeric(select(values, keep)),
            ColumnData::Text(values) => ColumnData::Text(select(values, keep)),
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }

    pub(crate) fn cell_key(&self, row: usize) -> CellKey<'_> {
        match &self.data {
            ColumnData::Numeric(values) => match values[row] {
                // -0.0 and 0.0 compare equal
                Some(v) => CellKey::Number(if v == 0.0 { 0 } else { v.to_bits() }),
                None => CellKey::Missing,
            },
            ColumnData::Text(values) => match &values[row] {
                Some(v) => CellKey::Text(v),
                None => CellKey::Missing,
            },
        }
    }
}

/// Hashable view of one cell, used for duplicate detection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
}

fn select<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| value.clone())
        .collect()
}
