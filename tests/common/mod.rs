//! Shared fixture: a temporary SQLite catalog with reference data.

#![allow(dead_code)]

use catalog_access::catalog::table;
use catalog_access::config::parse_database_url;
use catalog_access::models::FieldMap;
use catalog_access::sql::Statement;
use catalog_access::{Database, Dispatcher};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tempfile::NamedTempFile;

const SCHEMA: &[&str] = &[
    "CREATE TABLE genre (id TEXT PRIMARY KEY, libelle TEXT NOT NULL)",
    "CREATE TABLE public (id TEXT PRIMARY KEY, libelle TEXT NOT NULL)",
    "CREATE TABLE rayon (id TEXT PRIMARY KEY, libelle TEXT NOT NULL)",
    "CREATE TABLE suivi (id TEXT PRIMARY KEY, libelle TEXT NOT NULL)",
    "CREATE TABLE etat (id TEXT PRIMARY KEY, libelle TEXT NOT NULL)",
    "CREATE TABLE service (id TEXT PRIMARY KEY, libelle TEXT NOT NULL)",
    "CREATE TABLE document (
        id TEXT PRIMARY KEY,
        titre TEXT,
        image TEXT,
        idRayon TEXT REFERENCES rayon(id),
        idPublic TEXT REFERENCES public(id),
        idGenre TEXT REFERENCES genre(id)
    )",
    "CREATE TABLE livres_dvd (id TEXT PRIMARY KEY REFERENCES document(id))",
    "CREATE TABLE livre (
        id TEXT PRIMARY KEY REFERENCES livres_dvd(id),
        ISBN TEXT,
        auteur TEXT,
        collection TEXT
    )",
    "CREATE TABLE dvd (
        id TEXT PRIMARY KEY REFERENCES livres_dvd(id),
        synopsis TEXT,
        realisateur TEXT,
        duree INTEGER
    )",
    "CREATE TABLE revue (
        id TEXT PRIMARY KEY REFERENCES document(id),
        periodicite TEXT,
        delaiMiseADispo INTEGER
    )",
    "CREATE TABLE exemplaire (
        id TEXT REFERENCES document(id),
        numero INTEGER,
        dateAchat TEXT,
        photo TEXT,
        idEtat TEXT REFERENCES etat(id),
        PRIMARY KEY (id, numero)
    )",
    "CREATE TABLE commande (id TEXT PRIMARY KEY, dateCommande TEXT, montant REAL)",
    "CREATE TABLE commandedocument (
        id TEXT PRIMARY KEY REFERENCES commande(id),
        nbExemplaire INTEGER,
        idLivreDvd TEXT REFERENCES livres_dvd(id),
        idsuivi TEXT REFERENCES suivi(id)
    )",
    "CREATE TABLE abonnement (
        id TEXT PRIMARY KEY REFERENCES commande(id),
        dateFinAbonnement TEXT,
        idRevue TEXT REFERENCES revue(id)
    )",
    "CREATE TABLE utilisateur (
        id TEXT PRIMARY KEY,
        email TEXT UNIQUE,
        password TEXT,
        idservice TEXT REFERENCES service(id)
    )",
    "CREATE TABLE partenaire (id TEXT PRIMARY KEY, nom TEXT, ville TEXT)",
];

const SEED: &[&str] = &[
    "INSERT INTO genre VALUES ('10000', 'Humour'), ('10001', 'Science-fiction')",
    "INSERT INTO public VALUES ('00001', 'Jeunesse'), ('00002', 'Adultes')",
    "INSERT INTO rayon VALUES ('LV001', 'Littérature'), ('PR001', 'Presse')",
    "INSERT INTO suivi VALUES ('00001', 'en cours'), ('00002', 'livrée')",
    "INSERT INTO etat VALUES ('00001', 'neuf'), ('00002', 'usagé'), ('00003', 'abîmé')",
    "INSERT INTO service VALUES ('S1', 'administrateur'), ('S2', 'prêts')",
];

/// A catalog database living in a temporary file for the duration of a test.
pub struct TestCatalog {
    pub db: Database,
    pub dispatcher: Dispatcher,
    _file: NamedTempFile,
}

impl TestCatalog {
    pub async fn new() -> Self {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        let url = format!("sqlite:{}", file.path().display());
        let config = parse_database_url(&url).expect("Invalid test URL");
        let db = Database::connect(&config, Duration::from_secs(5))
            .await
            .expect("Failed to open test database");

        for sql in SCHEMA.iter().chain(SEED) {
            table::execute(&db, &Statement::raw(*sql))
                .await
                .unwrap_or_else(|e| panic!("setup statement failed: {e}\n{sql}"));
        }

        Self {
            dispatcher: Dispatcher::new(db.clone()),
            db,
            _file: file,
        }
    }

    /// Run raw SQL, for extra fixtures such as failure triggers.
    pub async fn exec(&self, sql: &str) {
        table::execute(&self.db, &Statement::raw(sql))
            .await
            .unwrap_or_else(|e| panic!("statement failed: {e}\n{sql}"));
    }

    /// Number of rows in `table` with the given id.
    pub async fn count(&self, table_name: &str, id: &str) -> usize {
        let filter = fields(serde_json::json!({ "id": id }));
        table::select(&self.db, table_name, &filter)
            .await
            .expect("count query failed")
            .len()
    }

    pub async fn insert_book(&self, id: &str, titre: &str) {
        let book = fields(serde_json::json!({
            "id": id,
            "titre": titre,
            "image": "",
            "idRayon": "LV001",
            "idPublic": "00002",
            "idGenre": "10001",
            "ISBN": "9782266320481",
            "auteur": "Frank Herbert",
            "collection": "Pocket SF"
        }));
        let created = self
            .dispatcher
            .insert("livre", Some(&book))
            .await
            .expect("book insert failed");
        assert_eq!(created, 1);
    }

    pub async fn insert_periodical(&self, id: &str, titre: &str) {
        let revue = fields(serde_json::json!({
            "id": id,
            "titre": titre,
            "image": "",
            "idRayon": "PR001",
            "idPublic": "00002",
            "idGenre": "10000",
            "periodicite": "weekly",
            "delaiMiseADispo": 3
        }));
        self.dispatcher
            .insert("revue", Some(&revue))
            .await
            .expect("periodical insert failed");
    }
}

/// Unwrap a `json!` object literal into a field map.
pub fn fields(value: JsonValue) -> FieldMap {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
