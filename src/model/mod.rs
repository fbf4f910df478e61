//! Data model for the in-memory record set and the destination schema

mod schema;
mod table;

pub use schema::{pokemon_table_schema, Column, Field, FieldType, TableSchema};
pub use table::{CellValue, RecordSet, Row};
