//! Integration tests for the generic single-table engine.

mod common;

use common::{TestCatalog, fields};
use serde_json::json;

#[tokio::test]
async fn test_unknown_entity_round_trip() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;

    let partner = fields(json!({"id": "P1", "nom": "Librairie du port", "ville": "Brest"}));
    assert_eq!(d.insert("partenaire", Some(&partner)).await.unwrap(), 1);

    let rows = d
        .select("partenaire", Some(&fields(json!({"ville": "Brest"}))))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["nom"], json!("Librairie du port"));

    let changes = fields(json!({"ville": "Quimper"}));
    assert_eq!(d.update("partenaire", Some("P1"), Some(&changes)).await.unwrap(), 1);

    let rows = d.select("partenaire", None).await.unwrap();
    assert_eq!(rows[0]["ville"], json!("Quimper"));

    let removed = d
        .delete("partenaire", Some(&fields(json!({"id": "P1"}))))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(catalog.count("partenaire", "P1").await, 0);
}

#[tokio::test]
async fn test_select_without_filter_returns_every_row() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;
    for id in ["P1", "P2", "P3"] {
        let partner = fields(json!({"id": id, "nom": id, "ville": "Rennes"}));
        d.insert("partenaire", Some(&partner)).await.unwrap();
    }

    assert_eq!(d.select("partenaire", None).await.unwrap().len(), 3);
    let empty = fields(json!({}));
    assert_eq!(d.select("partenaire", Some(&empty)).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_delete_without_filter_is_refused() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;
    d.insert("partenaire", Some(&fields(json!({"id": "P1", "nom": "A"}))))
        .await
        .unwrap();

    let err = d.delete("partenaire", None).await.unwrap_err();
    assert!(err.is_invalid_input());
    let err = d
        .delete("partenaire", Some(&fields(json!({}))))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    assert_eq!(catalog.count("partenaire", "P1").await, 1);
}

#[tokio::test]
async fn test_update_cannot_retarget_row() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;
    for id in ["P1", "P2"] {
        d.insert("partenaire", Some(&fields(json!({"id": id, "nom": "old"}))))
            .await
            .unwrap();
    }

    // The id in the field map never overrides the explicit identifier.
    let changes = fields(json!({"id": "P2", "nom": "new"}));
    assert_eq!(d.update("partenaire", Some("P1"), Some(&changes)).await.unwrap(), 1);

    let p1 = d
        .select("partenaire", Some(&fields(json!({"id": "P1"}))))
        .await
        .unwrap();
    let p2 = d
        .select("partenaire", Some(&fields(json!({"id": "P2"}))))
        .await
        .unwrap();
    assert_eq!(p1[0]["nom"], json!("new"));
    assert_eq!(p2[0]["nom"], json!("old"));
}

#[tokio::test]
async fn test_missing_inputs_are_rejected_before_the_database() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;

    assert!(d.insert("partenaire", None).await.unwrap_err().is_invalid_input());
    assert!(
        d.update("partenaire", None, Some(&fields(json!({"nom": "x"}))))
            .await
            .unwrap_err()
            .is_invalid_input()
    );
    assert!(
        d.update("partenaire", Some("P1"), None)
            .await
            .unwrap_err()
            .is_invalid_input()
    );
}

#[tokio::test]
async fn test_hostile_identifiers_are_refused() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;

    let err = d
        .select("partenaire; DROP TABLE document", None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    let err = d
        .select("partenaire", Some(&fields(json!({"nom = nom OR 1": 1}))))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    assert_eq!(catalog.count("document", "anything").await, 0);
}

#[tokio::test]
async fn test_constraint_violation_is_a_database_error() {
    let catalog = TestCatalog::new().await;
    let d = &catalog.dispatcher;
    let partner = fields(json!({"id": "P1", "nom": "A"}));
    d.insert("partenaire", Some(&partner)).await.unwrap();

    let err = d.insert("partenaire", Some(&partner)).await.unwrap_err();
    assert!(!err.is_invalid_input());
    assert!(matches!(err, catalog_access::DbError::Database { .. }));
}
