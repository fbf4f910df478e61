//! CSV loader: one file in, one record set out

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::LoadError;
use crate::model::{CellValue, Column, RecordSet};

/// Read a delimited text file into a record set.
///
/// The first line names the columns; every data row must have exactly as
/// many fields as the header, so ragged rows fail with [`LoadError::Parse`].
pub fn import(path: &Path) -> Result<RecordSet, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Parse { line: 1, source })?
        .clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(LoadError::EmptyHeader);
    }

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name, i))
        .collect();

    let mut records = RecordSet::new(columns);

    for (row_num, result) in reader.records().enumerate() {
        // +2: 1-indexed lines, header on line 1
        let line = row_num + 2;
        let record = result.map_err(|source| LoadError::Parse { line, source })?;
        let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
        records.add_row(cells, line);
    }

    Ok(records)
}

/// Parse one field: empty is null, then integer, then float, else text.
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    CellValue::Text(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("  "), CellValue::Null);
        assert_eq!(parse_cell_value("42"), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.14"), CellValue::Float(3.14));
        assert_eq!(
            parse_cell_value("Bulbasaur"),
            CellValue::Text("Bulbasaur".to_string())
        );
    }

    #[test]
    fn import_reads_header_and_rows() {
        let file = write_csv("english_name,hp,height_m\nBulbasaur,45,0.7\nIvysaur,60,1.0\n");
        let records = import(file.path()).unwrap();
        assert_eq!(records.column_names(), vec!["english_name", "hp", "height_m"]);
        assert_eq!(records.row_count(), 2);
        assert_eq!(records.rows[0].get(1), Some(&CellValue::Int(45)));
        assert_eq!(records.rows[1].get(2), Some(&CellValue::Float(1.0)));
        assert_eq!(records.rows[0].source_line, 2);
    }

    #[test]
    fn import_missing_file_is_file_not_found() {
        let err = import(Path::new("/nonexistent/pokemon.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn import_ragged_row_is_parse_error() {
        let file = write_csv("a,b,c\n1,2,3\n4,5\n");
        let err = import(file.path()).unwrap_err();
        match err {
            LoadError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn import_empty_cells_become_null() {
        let file = write_csv("a,b\n1,\n");
        let records = import(file.path()).unwrap();
        assert_eq!(records.rows[0].get(1), Some(&CellValue::Null));
    }
}
