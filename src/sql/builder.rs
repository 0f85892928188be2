//! SQL statement synthesis from field maps.
//!
//! Every statement produced here carries named placeholders (`:column`) and the
//! field map that binds them. Values never reach the SQL text; table and column
//! names are checked against a plain-identifier pattern before they do.

use crate::error::{DbError, DbResult};
use crate::models::FieldMap;
use serde_json::Value as JsonValue;

/// A parameterized statement: SQL text with named placeholders plus its bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: FieldMap,
}

impl Statement {
    /// Wrap fixed SQL text written at an internal call site.
    pub fn new(sql: impl Into<String>, params: FieldMap) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Fixed SQL text without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, FieldMap::new())
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &FieldMap {
        &self.params
    }

    /// `SELECT * FROM table [WHERE c1=:c1 AND ...]`.
    ///
    /// An empty filter selects every row.
    pub fn select(table: &str, filter: &FieldMap) -> DbResult<Self> {
        validate_identifier(table)?;
        if filter.is_empty() {
            return Ok(Self::raw(format!("SELECT * FROM {table}")));
        }
        let predicate = where_clause(filter)?;
        Ok(Self::new(
            format!("SELECT * FROM {table} WHERE {predicate}"),
            filter.clone(),
        ))
    }

    /// `INSERT INTO table (c1,c2) VALUES (:c1,:c2)`.
    pub fn insert(table: &str, fields: &FieldMap) -> DbResult<Self> {
        validate_identifier(table)?;
        if fields.is_empty() {
            return Err(DbError::invalid_input(format!(
                "insert into '{table}' requires at least one field"
            )));
        }
        let columns = column_list(fields)?;
        Ok(Self::new(
            format!("INSERT INTO {table} {columns}"),
            fields.clone(),
        ))
    }

    /// `UPDATE table SET c1=:c1,... WHERE k1=:k1 AND ...`.
    ///
    /// Key columns are bound from `key` only: a key column present in `fields`
    /// is dropped from the SET list and can never override the key value.
    pub fn update(table: &str, fields: &FieldMap, key: &FieldMap) -> DbResult<Self> {
        validate_identifier(table)?;
        if key.is_empty() {
            return Err(DbError::invalid_input(format!(
                "update of '{table}' requires an identifier"
            )));
        }
        let assigned: FieldMap = fields
            .iter()
            .filter(|(column, _)| !key.contains_key(column.as_str()))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();
        if assigned.is_empty() {
            return Err(DbError::invalid_input(format!(
                "update of '{table}' requires at least one field to change"
            )));
        }

        let assignments = assignment_list(&assigned)?;
        let predicate = where_clause(key)?;
        let mut params = assigned;
        params.extend(key.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(Self::new(
            format!("UPDATE {table} SET {assignments} WHERE {predicate}"),
            params,
        ))
    }

    /// Update keyed by the `id` column.
    pub fn update_by_id(table: &str, id: &str, fields: &FieldMap) -> DbResult<Self> {
        let mut key = FieldMap::new();
        key.insert("id".to_string(), JsonValue::String(id.to_string()));
        Self::update(table, fields, &key)
    }

    /// `DELETE FROM table WHERE c1=:c1 AND ...`.
    ///
    /// An empty filter is refused; this never emits an unconditional DELETE.
    pub fn delete(table: &str, filter: &FieldMap) -> DbResult<Self> {
        validate_identifier(table)?;
        if filter.is_empty() {
            return Err(DbError::invalid_input(format!(
                "delete from '{table}' requires a non-empty filter"
            )));
        }
        let predicate = where_clause(filter)?;
        Ok(Self::new(
            format!("DELETE FROM {table} WHERE {predicate}"),
            filter.clone(),
        ))
    }
}

/// Equality conjunction: `c1=:c1 AND c2=:c2`.
pub fn where_clause(fields: &FieldMap) -> DbResult<String> {
    let parts = fields
        .keys()
        .map(|column| {
            validate_identifier(column)?;
            Ok(format!("{column}=:{column}"))
        })
        .collect::<DbResult<Vec<_>>>()?;
    Ok(parts.join(" AND "))
}

/// Column and placeholder lists: `(c1,c2) VALUES (:c1,:c2)`.
pub fn column_list(fields: &FieldMap) -> DbResult<String> {
    for column in fields.keys() {
        validate_identifier(column)?;
    }
    let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
    let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
    Ok(format!(
        "({}) VALUES ({})",
        columns.join(","),
        placeholders.join(",")
    ))
}

/// Assignment list: `c1=:c1,c2=:c2`.
pub fn assignment_list(fields: &FieldMap) -> DbResult<String> {
    let parts = fields
        .keys()
        .map(|column| {
            validate_identifier(column)?;
            Ok(format!("{column}=:{column}"))
        })
        .collect::<DbResult<Vec<_>>>()?;
    Ok(parts.join(","))
}

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> DbResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DbError::invalid_input(format!(
            "'{name}' is not a valid table or column name"
        )))
    }
}
