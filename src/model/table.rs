//! Record set, Row, and Cell data structures

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::TransformError;

use super::schema::Column;

/// A cell value with type information
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Render for the CSV bulk-load body. Null becomes an empty field.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

/// A row in the record set
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line number in the source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// An in-memory table of uniform-schema rows, in column order
#[derive(Debug)]
pub struct RecordSet {
    /// Column definitions, in header order
    pub columns: Vec<Column>,
    /// All rows
    pub rows: Vec<Row>,
    /// Column name to index for O(1) lookup, kept in column order
    index: IndexMap<String, usize>,
}

impl RecordSet {
    /// Create a new empty record set with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self {
            columns,
            rows: Vec::new(),
            index,
        }
    }

    /// Add a row to the record set
    pub fn add_row(&mut self, cells: Vec<CellValue>, source_line: usize) {
        self.rows.push(Row::new(cells, source_line));
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names in column order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rename a column, keeping its position and cell values.
    ///
    /// Fails if `old` does not exist or `new` already names another column.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<(), TransformError> {
        let idx = self
            .column_index(old)
            .ok_or_else(|| TransformError::MissingColumn(old.to_string()))?;
        if old != new && self.has_column(new) {
            return Err(TransformError::DuplicateColumn(new.to_string()));
        }
        self.columns[idx].name = new.to_string();
        self.rebuild_index();
        Ok(())
    }

    /// Drop every named column that exists. Absent names are skipped.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let doomed: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        if doomed.is_empty() {
            return;
        }
        let keep: Vec<usize> = (0..self.column_count())
            .filter(|i| !doomed.contains(i))
            .collect();

        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            row.cells = keep
                .iter()
                .filter_map(|&i| row.cells.get(i).cloned())
                .collect();
        }
        self.rebuild_index();
    }

    /// Remove a single column if present
    pub fn remove_column(&mut self, name: &str) {
        self.drop_columns(&[name]);
    }

    /// Append a new integer column with the given fill value for every row
    pub fn push_int_column(&mut self, name: &str, fill: i64) {
        self.columns.push(Column::new(name, self.columns.len()));
        for row in &mut self.rows {
            row.cells.push(CellValue::Int(fill));
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .columns
            .iter_mut()
            .enumerate()
            .map(|(i, c)| {
                c.index = i;
                (c.name.clone(), i)
            })
            .collect();
    }
}
