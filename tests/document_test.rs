//! Integration tests for books, DVDs and periodicals.
//!
//! Each document spans `document`, an optional `livres_dvd` marker and a
//! subtype table; these tests check that the tables never drift apart.

mod common;

use common::{TestCatalog, fields};
use serde_json::json;

#[tokio::test]
async fn test_book_create_then_delete() {
    let catalog = TestCatalog::new().await;
    catalog.insert_book("00017", "Dune").await;

    assert_eq!(catalog.count("document", "00017").await, 1);
    assert_eq!(catalog.count("livres_dvd", "00017").await, 1);
    assert_eq!(catalog.count("livre", "00017").await, 1);

    let removed = catalog
        .dispatcher
        .delete("livre", Some(&fields(json!({"id": "00017"}))))
        .await
        .unwrap();
    assert_eq!(removed, 1);

    for table in ["livre", "livres_dvd", "document"] {
        assert_eq!(catalog.count(table, "00017").await, 0, "{table} row left behind");
    }
}

#[tokio::test]
async fn test_failed_subtype_insert_leaves_no_parent() {
    let catalog = TestCatalog::new().await;
    catalog
        .exec(
            "CREATE TRIGGER reject_livre BEFORE INSERT ON livre WHEN NEW.auteur = 'REJECT' \
             BEGIN SELECT RAISE(ABORT, 'livre rejected'); END",
        )
        .await;

    let book = fields(json!({
        "id": "00018",
        "titre": "Rejected",
        "image": "",
        "idRayon": "LV001",
        "idPublic": "00001",
        "idGenre": "10000",
        "ISBN": "",
        "auteur": "REJECT",
        "collection": ""
    }));
    let err = catalog.dispatcher.insert("livre", Some(&book)).await;
    assert!(err.is_err());

    assert_eq!(catalog.count("document", "00018").await, 0);
    assert_eq!(catalog.count("livres_dvd", "00018").await, 0);
}

#[tokio::test]
async fn test_failed_delete_keeps_every_row() {
    let catalog = TestCatalog::new().await;
    catalog.insert_book("00019", "Fondation").await;
    catalog
        .exec(
            "CREATE TRIGGER lock_document BEFORE DELETE ON document \
             BEGIN SELECT RAISE(ABORT, 'locked'); END",
        )
        .await;

    let result = catalog
        .dispatcher
        .delete("livre", Some(&fields(json!({"id": "00019"}))))
        .await;
    assert!(result.is_err());

    // The subtype and marker deletes ran before the failure and were rolled back.
    assert_eq!(catalog.count("livre", "00019").await, 1);
    assert_eq!(catalog.count("livres_dvd", "00019").await, 1);
    assert_eq!(catalog.count("document", "00019").await, 1);
}

#[tokio::test]
async fn test_update_touches_both_tables() {
    let catalog = TestCatalog::new().await;
    catalog.insert_book("00020", "Hyperion").await;

    let changes = fields(json!({"titre": "Hypérion", "auteur": "Dan Simmons", "unknown": 1}));
    let updated = catalog
        .dispatcher
        .update("livre", Some("00020"), Some(&changes))
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let books = catalog.dispatcher.select("livre", None).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["titre"], json!("Hypérion"));
    assert_eq!(books[0]["auteur"], json!("Dan Simmons"));
    assert_eq!(books[0]["collection"], json!("Pocket SF"));
}

#[tokio::test]
async fn test_update_without_known_columns_is_refused() {
    let catalog = TestCatalog::new().await;
    catalog.insert_book("00021", "Ubik").await;

    let changes = fields(json!({"nonexistent": "x"}));
    let err = catalog
        .dispatcher
        .update("livre", Some("00021"), Some(&changes))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
async fn test_periodical_listing_carries_labels() {
    let catalog = TestCatalog::new().await;
    catalog.insert_periodical("R1", "Weekly").await;

    assert_eq!(catalog.count("livres_dvd", "R1").await, 0);

    let rows = catalog.dispatcher.select("revue", None).await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["id"], json!("R1"));
    assert_eq!(row["titre"], json!("Weekly"));
    assert_eq!(row["periodicite"], json!("weekly"));
    assert_eq!(row["genre"], json!("Humour"));
    assert_eq!(row["lePublic"], json!("Adultes"));
    assert_eq!(row["rayon"], json!("Presse"));
}

#[tokio::test]
async fn test_listing_is_ordered_by_title() {
    let catalog = TestCatalog::new().await;
    catalog.insert_book("00030", "Solaris").await;
    catalog.insert_book("00031", "Axiomatique").await;
    catalog.insert_book("00032", "Neuromancien").await;

    let titles: Vec<_> = catalog
        .dispatcher
        .select("livre", None)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row["titre"].clone())
        .collect();
    assert_eq!(titles, vec![json!("Axiomatique"), json!("Neuromancien"), json!("Solaris")]);
}

#[tokio::test]
async fn test_dvd_create_and_list() {
    let catalog = TestCatalog::new().await;
    let dvd = fields(json!({
        "id": "20001",
        "titre": "Stalker",
        "image": "",
        "idRayon": "LV001",
        "idPublic": "00002",
        "idGenre": "10001",
        "synopsis": "La Zone",
        "realisateur": "Tarkovski",
        "duree": 161
    }));
    assert_eq!(catalog.dispatcher.insert("dvd", Some(&dvd)).await.unwrap(), 1);
    assert_eq!(catalog.count("livres_dvd", "20001").await, 1);

    let rows = catalog.dispatcher.select("dvd", None).await.unwrap();
    assert_eq!(rows[0]["duree"], json!(161));
    assert_eq!(rows[0]["realisateur"], json!("Tarkovski"));
}

#[tokio::test]
async fn test_insert_without_id_is_refused() {
    let catalog = TestCatalog::new().await;
    let book = fields(json!({"titre": "Anonyme"}));
    let err = catalog
        .dispatcher
        .insert("livre", Some(&book))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());
    assert!(catalog.dispatcher.select("livre", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_subtype_update_keeps_document_unchanged() {
    let catalog = TestCatalog::new().await;
    catalog.insert_book("00022", "Avant").await;
    catalog
        .exec(
            "CREATE TRIGGER lock_livre BEFORE UPDATE ON livre \
             BEGIN SELECT RAISE(ABORT, 'locked'); END",
        )
        .await;

    let changes = fields(json!({"titre": "Après", "auteur": "Quelqu'un"}));
    let result = catalog
        .dispatcher
        .update("livre", Some("00022"), Some(&changes))
        .await;
    assert!(result.is_err());

    let document = catalog_access::catalog::table::select(
        &catalog.db,
        "document",
        &fields(json!({"id": "00022"})),
    )
    .await
    .unwrap();
    assert_eq!(document[0]["titre"], json!("Avant"));
}

#[tokio::test]
async fn test_failed_periodical_update_keeps_document_unchanged() {
    let catalog = TestCatalog::new().await;
    catalog.insert_periodical("R2", "Mensuel").await;
    catalog
        .exec(
            "CREATE TRIGGER lock_revue BEFORE UPDATE ON revue \
             BEGIN SELECT RAISE(ABORT, 'locked'); END",
        )
        .await;

    let changes = fields(json!({"titre": "Hebdo", "periodicite": "weekly"}));
    let result = catalog
        .dispatcher
        .update("revue", Some("R2"), Some(&changes))
        .await;
    assert!(result.is_err());

    let rows = catalog.dispatcher.select("revue", None).await.unwrap();
    assert_eq!(rows[0]["titre"], json!("Mensuel"));
}
