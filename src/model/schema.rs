//! Column metadata and the destination table schema

use serde::{Deserialize, Serialize};

/// Column type as BigQuery understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "INT64")]
    Int64,
    #[serde(rename = "FLOAT64")]
    Float64,
    #[serde(rename = "STRING")]
    Text,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Int64 => write!(f, "INT64"),
            FieldType::Float64 => write!(f, "FLOAT64"),
            FieldType::Text => write!(f, "STRING"),
        }
    }
}

/// A single (name, type) pair in the destination schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered schema for the destination table. Order matters for the
/// headerless CSV bulk-load body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<Field>,
}

impl TableSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Field names in schema order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Column metadata in an in-memory record set
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// The destination table layout for the transformed Pokémon record set:
/// fixed names and order, 43 columns ending in the three battle counters.
pub fn pokemon_table_schema() -> TableSchema {
    use FieldType::{Float64, Int64, Text};

    TableSchema::new(vec![
        Field::new("national_number", Int64),
        Field::new("gen", Text),
        Field::new("name", Text),
        Field::new("primary_type", Text),
        Field::new("secondary_type", Text),
        Field::new("classification", Text),
        Field::new("height_m", Float64),
        Field::new("weight_kg", Float64),
        Field::new("hp", Int64),
        Field::new("attack", Int64),
        Field::new("defense", Int64),
        Field::new("sp_attack", Int64),
        Field::new("sp_defense", Int64),
        Field::new("speed", Int64),
        Field::new("abilities_0", Text),
        Field::new("abilities_1", Text),
        Field::new("abilities_2", Text),
        Field::new("abilities_hidden", Text),
        Field::new("against_normal", Float64),
        Field::new("against_fire", Float64),
        Field::new("against_water", Float64),
        Field::new("against_electric", Float64),
        Field::new("against_grass", Float64),
        Field::new("against_ice", Float64),
        Field::new("against_fighting", Float64),
        Field::new("against_poison", Float64),
        Field::new("against_ground", Float64),
        Field::new("against_flying", Float64),
        Field::new("against_psychic", Float64),
        Field::new("against_bug", Float64),
        Field::new("against_rock", Float64),
        Field::new("against_ghost", Float64),
        Field::new("against_dragon", Float64),
        Field::new("against_dark", Float64),
        Field::new("against_steel", Float64),
        Field::new("against_fairy", Float64),
        Field::new("is_sublegendary", Int64),
        Field::new("is_legendary", Int64),
        Field::new("is_mythical", Int64),
        Field::new("description", Text),
        Field::new("wins", Int64),
        Field::new("losses", Int64),
        Field::new("times_chosen", Int64),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokemon_schema_is_fixed_and_ordered() {
        let schema = pokemon_table_schema();
        assert_eq!(schema.len(), 43);
        assert_eq!(schema.fields[0].name, "national_number");
        assert_eq!(schema.fields[2].name, "name");
        let names = schema.field_names();
        assert_eq!(
            &names[names.len() - 4..],
            &["description", "wins", "losses", "times_chosen"]
        );
    }

    #[test]
    fn field_type_serializes_to_bigquery_names() {
        let json = serde_json::to_string(&Field::new("hp", FieldType::Int64)).unwrap();
        assert_eq!(json, r#"{"name":"hp","type":"INT64"}"#);
        let json = serde_json::to_string(&Field::new("height_m", FieldType::Float64)).unwrap();
        assert!(json.contains("FLOAT64"));
        let json = serde_json::to_string(&Field::new("gen", FieldType::Text)).unwrap();
        assert!(json.contains("STRING"));
    }
}
