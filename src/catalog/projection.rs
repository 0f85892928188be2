//! Projection of a caller's field map onto the columns of one physical table.
//!
//! Lookups are ASCII case-insensitive (an exact match wins), and the emitted
//! map always uses the canonical column spelling.

use crate::error::{DbError, DbResult};
use crate::models::FieldMap;
use serde_json::Value as JsonValue;

pub const DOCUMENT_COLUMNS: &[&str] = &["id", "titre", "image", "idRayon", "idPublic", "idGenre"];
pub const BOOK_COLUMNS: &[&str] = &["id", "ISBN", "auteur", "collection"];
pub const DVD_COLUMNS: &[&str] = &["id", "synopsis", "realisateur", "duree"];
pub const PERIODICAL_COLUMNS: &[&str] = &["id", "periodicite", "delaiMiseADispo"];
pub const ORDER_COLUMNS: &[&str] = &["id", "dateCommande", "montant"];
pub const DOCUMENT_ORDER_COLUMNS: &[&str] = &["id", "nbExemplaire", "idLivreDvd", "idsuivi"];
pub const SUBSCRIPTION_COLUMNS: &[&str] = &["id", "dateFinAbonnement", "idRevue"];

/// Find a field by column name.
pub fn lookup<'a>(fields: &'a FieldMap, column: &str) -> Option<&'a JsonValue> {
    fields.get(column).or_else(|| {
        fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    })
}

/// Find a field that must be present.
pub fn require<'a>(fields: &'a FieldMap, column: &str, context: &str) -> DbResult<&'a JsonValue> {
    lookup(fields, column)
        .filter(|value| !value.is_null())
        .ok_or_else(|| DbError::invalid_input(format!("{context} requires '{column}'")))
}

/// Keep the listed columns that are present, under their canonical names.
pub fn project(fields: &FieldMap, columns: &[&str]) -> FieldMap {
    columns
        .iter()
        .filter_map(|column| lookup(fields, column).map(|v| (column.to_string(), v.clone())))
        .collect()
}

/// Projection for an UPDATE: the key column is never part of the SET list.
pub fn project_for_update(fields: &FieldMap, columns: &[&str]) -> FieldMap {
    columns
        .iter()
        .filter(|column| **column != "id")
        .filter_map(|column| lookup(fields, column).map(|v| (column.to_string(), v.clone())))
        .collect()
}

/// Single-entry map, used for key predicates.
pub fn key(column: &str, value: JsonValue) -> FieldMap {
    let mut map = FieldMap::new();
    map.insert(column.to_string(), value);
    map
}
