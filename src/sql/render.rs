//! Rendering of named placeholders into backend-specific positional form.

use crate::error::{DbError, DbResult};
use crate::models::{DatabaseType, QueryParam};
use crate::sql::Statement;

/// SQL text ready for the driver plus its parameters in bind order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStatement {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl Statement {
    /// Rewrite `:name` placeholders to `?` (MySQL, SQLite) or `$n` (PostgreSQL).
    ///
    /// A name used twice is bound twice. Single-quoted literals and `::` casts
    /// are left alone.
    pub fn render(&self, db_type: DatabaseType) -> DbResult<RenderedStatement> {
        let source = self.sql();
        let mut sql = String::with_capacity(source.len());
        let mut params = Vec::new();
        let mut in_literal = false;
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            if c == '\'' {
                in_literal = !in_literal;
                sql.push(c);
                continue;
            }
            if in_literal || c != ':' {
                sql.push(c);
                continue;
            }
            // "::" is a PostgreSQL cast, copy both colons through
            if let Some(&(_, ':')) = chars.peek() {
                sql.push_str("::");
                chars.next();
                continue;
            }
            let starts_name = matches!(
                chars.peek(),
                Some(&(_, next)) if next.is_ascii_alphabetic() || next == '_'
            );
            if !starts_name {
                sql.push(c);
                continue;
            }

            let name_start = pos + 1;
            let mut name_end = name_start;
            while let Some(&(idx, next)) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name_end = idx + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let name = &source[name_start..name_end];
            let value = self.params().get(name).ok_or_else(|| {
                DbError::invalid_input(format!("no value bound for placeholder ':{name}'"))
            })?;
            params.push(QueryParam::from(value));

            if db_type.uses_numbered_placeholders() {
                sql.push('$');
                sql.push_str(&params.len().to_string());
            } else {
                sql.push('?');
            }
        }

        Ok(RenderedStatement { sql, params })
    }
}
