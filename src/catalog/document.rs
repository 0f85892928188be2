//! Books, DVDs and periodicals: a shared `document` row plus a subtype row.
//!
//! Books and DVDs also carry a marker row in `livres_dvd`. Rows are created
//! parent first and deleted parent last, all inside one transaction.

use crate::catalog::projection::{
    self, BOOK_COLUMNS, DOCUMENT_COLUMNS, DVD_COLUMNS, PERIODICAL_COLUMNS,
};
use crate::catalog::table::{self, EntityHandler};
use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::models::{FieldMap, Row};
use crate::sql::Statement;
use tracing::info;

const DOCUMENT_TABLE: &str = "document";
const MARKER_TABLE: &str = "livres_dvd";

/// Static description of one document subtype.
#[derive(Debug)]
pub struct DocumentKind {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub has_marker: bool,
    /// Listing joined with the genre, public and rayon labels, ordered by title.
    pub listing: &'static str,
}

pub static BOOK: DocumentKind = DocumentKind {
    name: "book",
    table: "livre",
    columns: BOOK_COLUMNS,
    has_marker: true,
    listing: "SELECT l.id, l.ISBN, l.auteur, d.titre, d.image, l.collection, \
              d.idrayon, d.idpublic, d.idgenre, g.libelle AS genre, p.libelle AS lePublic, r.libelle AS rayon \
              FROM livre l JOIN document d ON l.id=d.id \
              JOIN genre g ON g.id=d.idGenre \
              JOIN public p ON p.id=d.idPublic \
              JOIN rayon r ON r.id=d.idRayon \
              ORDER BY titre",
};

pub static DVD: DocumentKind = DocumentKind {
    name: "dvd",
    table: "dvd",
    columns: DVD_COLUMNS,
    has_marker: true,
    listing: "SELECT l.id, l.duree, l.realisateur, d.titre, d.image, l.synopsis, \
              d.idrayon, d.idpublic, d.idgenre, g.libelle AS genre, p.libelle AS lePublic, r.libelle AS rayon \
              FROM dvd l JOIN document d ON l.id=d.id \
              JOIN genre g ON g.id=d.idGenre \
              JOIN public p ON p.id=d.idPublic \
              JOIN rayon r ON r.id=d.idRayon \
              ORDER BY titre",
};

pub static PERIODICAL: DocumentKind = DocumentKind {
    name: "periodical",
    table: "revue",
    columns: PERIODICAL_COLUMNS,
    has_marker: false,
    listing: "SELECT l.id, l.periodicite, d.titre, d.image, l.delaiMiseADispo, \
              d.idrayon, d.idpublic, d.idgenre, g.libelle AS genre, p.libelle AS lePublic, r.libelle AS rayon \
              FROM revue l JOIN document d ON l.id=d.id \
              JOIN genre g ON g.id=d.idGenre \
              JOIN public p ON p.id=d.idPublic \
              JOIN rayon r ON r.id=d.idRayon \
              ORDER BY titre",
};

/// Composite handler for one document subtype.
#[derive(Debug, Clone, Copy)]
pub struct DocumentHandler {
    kind: &'static DocumentKind,
}

impl DocumentHandler {
    pub fn new(kind: &'static DocumentKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> &'static DocumentKind {
        self.kind
    }
}

impl EntityHandler for DocumentHandler {
    fn table(&self) -> &str {
        self.kind.table
    }

    /// Full listing of the subtype; the filter is not applied.
    async fn select(&self, db: &Database, _filter: &FieldMap) -> DbResult<Vec<Row>> {
        table::query(db, &Statement::raw(self.kind.listing)).await
    }

    /// Insert `document`, the marker row when the subtype has one, then the subtype row.
    async fn insert(&self, db: &Database, fields: &FieldMap) -> DbResult<u64> {
        let id = projection::require(fields, "id", self.kind.name)?;
        let key = projection::key("id", id.clone());
        let document = projection::project(fields, DOCUMENT_COLUMNS);
        let detail = projection::project(fields, self.kind.columns);

        let mut tx = db.begin().await?;
        let result: DbResult<u64> = async {
            table::insert(&mut tx, DOCUMENT_TABLE, &document).await?;
            if self.kind.has_marker {
                table::insert(&mut tx, MARKER_TABLE, &key).await?;
            }
            table::insert(&mut tx, self.kind.table, &detail).await?;
            Ok(1)
        }
        .await;
        let created = tx.finish(result).await?;
        info!(kind = self.kind.name, id = %table::id_text(id), "Document created");
        Ok(created)
    }

    /// Update `document` and the subtype row; the marker row is left alone.
    async fn update(&self, db: &Database, id: &str, fields: &FieldMap) -> DbResult<u64> {
        if id.is_empty() {
            return Err(DbError::invalid_input(format!(
                "{} update requires an identifier",
                self.kind.name
            )));
        }
        let document = projection::project_for_update(fields, DOCUMENT_COLUMNS);
        let detail = projection::project_for_update(fields, self.kind.columns);
        if document.is_empty() && detail.is_empty() {
            return Err(DbError::invalid_input(format!(
                "{} update has no known column to change",
                self.kind.name
            )));
        }

        let mut tx = db.begin().await?;
        let result: DbResult<u64> = async {
            if !document.is_empty() {
                table::update(&mut tx, DOCUMENT_TABLE, id, &document).await?;
            }
            if !detail.is_empty() {
                table::update(&mut tx, self.kind.table, id, &detail).await?;
            }
            Ok(1)
        }
        .await;
        let updated = tx.finish(result).await?;
        info!(kind = self.kind.name, id, "Document updated");
        Ok(updated)
    }

    /// Delete the subtype row, the marker row, then `document`.
    ///
    /// Returns the number of `document` rows removed.
    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        let id = projection::require(filter, "id", self.kind.name)?;
        let key = projection::key("id", id.clone());

        let mut tx = db.begin().await?;
        let result: DbResult<u64> = async {
            table::delete(&mut tx, self.kind.table, &key).await?;
            if self.kind.has_marker {
                table::delete(&mut tx, MARKER_TABLE, &key).await?;
            }
            table::delete(&mut tx, DOCUMENT_TABLE, &key).await
        }
        .await;
        let removed = tx.finish(result).await?;
        info!(kind = self.kind.name, id = %table::id_text(id), removed, "Document deleted");
        Ok(removed)
    }
}
