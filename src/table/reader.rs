use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::ReaderBuilder;

use super::{Column, Table};
use crate::{Error, Result};

/// Cell contents read as a missing value.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads a UTF-8, comma-delimited file with a header row into a [`Table`].
///
/// A column becomes numeric when every present cell parses as `f64`
/// (a column with no present cells is numeric too), otherwise it is text.
/// Non-finite numbers (`inf`, `NaN` in any case) read as missing.
pub fn read_csv(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(Error::InputMalformed(format!(
            "{} is not a file",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let malformed = |e: csv::Error| Error::InputMalformed(format!("{}: {e}", path.display()));

    let headers = rdr.headers().map_err(malformed)?.clone();
    if headers.is_empty() {
        return Err(Error::InputMalformed(format!(
            "{}: no header row",
            path.display()
        )));
    }
    let names = column_names(&headers);

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for result in rdr.records() {
        let record = result.map_err(malformed)?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(if MISSING_MARKERS.contains(&field) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Table::new(columns)
}

fn column_names(headers: &csv::StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for (i, raw) in headers.iter().enumerate() {
        let raw = if i == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw
        };
        let base = if raw.is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn infer_column(name: String, values: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|cell| match cell {
            Some(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .map(|v| v.is_finite().then_some(v)),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(numbers) => Column::numeric(name, numbers),
        None => Column::text(name, values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_infers_column_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "hh.csv",
            "level,years,salary\njunior,1,50000\nsenior,5.5,150000\n",
        );

        let table = read_csv(&path).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert!(!table.column("level").unwrap().is_numeric());
        assert_eq!(
            table.column("years").unwrap().as_numeric().unwrap(),
            &[Some(1.0), Some(5.5)]
        );
        assert!(table.column("salary").unwrap().is_numeric());
    }

    #[test]
    fn test_missing_markers_and_unnamed_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "hh.csv",
            ",city,years,salary\n0,Moscow,NA,100\n1,,3,\n2,Kazan,4,120\n",
        );

        let table = read_csv(&path).unwrap();
        assert_eq!(table.column_names(), vec!["Unnamed: 0", "city", "years", "salary"]);
        assert_eq!(table.column("city").unwrap().missing_count(), 1);
        assert_eq!(table.column("years").unwrap().missing_count(), 1);
        assert!(table.column("years").unwrap().is_numeric());
        assert_eq!(table.column("salary").unwrap().missing_count(), 1);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "hh.csv", "note,salary\n,1\nNA,2\n");
        let table = read_csv(&path).unwrap();
        assert!(table.column("note").unwrap().is_numeric());
    }

    #[test]
    fn test_non_finite_numbers_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "hh.csv",
            "years,salary\ninf,1\n-Infinity,2\nNAN,3\n4,4\n",
        );

        let table = read_csv(&path).unwrap();
        assert_eq!(
            table.column("years").unwrap().as_numeric().unwrap(),
            &[None, None, None, Some(4.0)]
        );
    }

    #[test]
    fn test_duplicate_headers_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "hh.csv", "\u{feff}a,a,a\n1,2,3\n");
        let table = read_csv(&path).unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "hh.csv", "level,salary\n");
        let table = read_csv(&path).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "hh.csv", "a,b\n1,2\n3\n");
        assert!(matches!(read_csv(&path), Err(Error::InputMalformed(_))));
    }

    #[test]
    fn test_empty_file_and_directory_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.csv", "");
        assert!(matches!(read_csv(&path), Err(Error::InputMalformed(_))));
        assert!(matches!(read_csv(dir.path()), Err(Error::InputMalformed(_))));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        fs::write(&path, b"name,salary\n\xe9t\xe9,1\n").unwrap();
        assert!(matches!(read_csv(&path), Err(Error::InputMalformed(_))));
    }
}
