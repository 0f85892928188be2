//! Credential lookup against the `utilisateur` and `service` tables.

use crate::auth::PasswordVerifier;
use crate::db::Executor;
use crate::error::DbResult;
use crate::models::{FieldMap, Row};
use crate::sql::Statement;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

const LOGIN_SQL: &str = "SELECT u.id, u.email, u.password, u.idservice, s.libelle \
     FROM utilisateur u \
     JOIN service s ON u.idservice = s.id \
     WHERE u.email = :email";

/// Column holding the stored password hash.
const HASH_COLUMN: &str = "password";

/// Look a user up by email and verify the plaintext password.
///
/// Returns the user row without its hash on success and `None` when either
/// credential is missing, the email is unknown, or the password does not match.
pub async fn authenticate<E: Executor>(
    mut exec: E,
    verifier: &dyn PasswordVerifier,
    credentials: &FieldMap,
) -> DbResult<Option<Row>> {
    let (Some(email), Some(password)) = (
        credentials.get("email").and_then(JsonValue::as_str),
        credentials.get("password").and_then(JsonValue::as_str),
    ) else {
        debug!("Login refused: email or password missing");
        return Ok(None);
    };

    let mut params = FieldMap::new();
    params.insert("email".to_string(), JsonValue::String(email.to_string()));
    let rows = exec.fetch_all(&Statement::new(LOGIN_SQL, params)).await?;

    let Some(row) = rows.into_iter().next() else {
        debug!("Login rejected: unknown email");
        return Ok(None);
    };

    let matches = row
        .get(HASH_COLUMN)
        .and_then(JsonValue::as_str)
        .is_some_and(|hash| verifier.verify(password, hash));
    if !matches {
        debug!("Login rejected: password mismatch");
        return Ok(None);
    }

    let user: Row = row
        .into_iter()
        .filter(|(column, _)| column != HASH_COLUMN)
        .collect();
    info!(user_id = %user.get("id").unwrap_or(&JsonValue::Null), "Login accepted");
    Ok(Some(user))
}
