//! SQLite-backed artifact store.
//!
//! Artifacts live in one table, their list-valued attributes (tags,
//! software, declared formats) in a shared `taggings` table keyed by
//! context, and mirrors in their own ordered table. Queries built in
//! [`crate::search`] are evaluated here as a single `SELECT`.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Artifact, License, NewArtifact, StoredFile};
use crate::search::{ArtifactQuery, TagContext};

/// Errors that can occur while reading or writing the catalog
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown license: {0}")]
    UnknownLicense(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS licenses (
    short_name TEXT PRIMARY KEY COLLATE NOCASE,
    name       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artifacts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    author      TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    file_name   TEXT,
    file_hash   TEXT,
    license     TEXT NOT NULL REFERENCES licenses(short_name),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mirrors (
    artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
    position    INTEGER NOT NULL,
    url         TEXT NOT NULL,
    PRIMARY KEY (artifact_id, position)
);

CREATE TABLE IF NOT EXISTS taggings (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
    context     TEXT NOT NULL,
    tag         TEXT NOT NULL COLLATE NOCASE,
    created_at  TEXT NOT NULL,
    UNIQUE (artifact_id, context, tag)
);

CREATE INDEX IF NOT EXISTS taggings_by_tag ON taggings (context, tag);
CREATE INDEX IF NOT EXISTS artifacts_by_hash ON artifacts (file_hash);
"#;

const ARTIFACT_COLUMNS: &str = "a.id, a.name, a.author, a.description, a.file_name, a.file_hash, \
     a.created_at, l.short_name, l.name";

/// A tag value and how many artifacts carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// The artifact catalog database
pub struct ArtifactStore {
    conn: Connection,
}

impl ArtifactStore {
    /// Open (or create) the catalog database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!("Opening catalog database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory catalog
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // =========================================================================
    // Licenses
    // =========================================================================

    /// Add a license. Returns `false` if the short code is already taken.
    pub fn add_license(&self, license: &License) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT INTO licenses (short_name, name) VALUES (?1, ?2)
             ON CONFLICT(short_name) DO NOTHING",
            params![license.short_name, license.name],
        )?;
        Ok(inserted > 0)
    }

    /// Look up a license by short code
    pub fn license(&self, short_name: &str) -> Result<Option<License>, StoreError> {
        let license = self
            .conn
            .query_row(
                "SELECT short_name, name FROM licenses WHERE short_name = ?1",
                [short_name],
                |row| Ok(License::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(license)
    }

    /// All licenses, ordered by short code
    pub fn licenses(&self) -> Result<Vec<License>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT short_name, name FROM licenses ORDER BY short_name")?;
        let licenses = stmt
            .query_map([], |row| {
                Ok(License::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(licenses)
    }

    // =========================================================================
    // Artifacts
    // =========================================================================

    /// Store a new artifact and return it as read back
    pub fn insert(&mut self, artifact: &NewArtifact) -> Result<Artifact, StoreError> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        let license: String = tx
            .query_row(
                "SELECT short_name FROM licenses WHERE short_name = ?1",
                [&artifact.license],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::UnknownLicense(artifact.license.clone()))?;

        tx.execute(
            "INSERT INTO artifacts (name, author, description, file_name, file_hash, license, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                artifact.name,
                artifact.author,
                artifact.description,
                artifact.file,
                artifact.file_hash,
                license,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();

        let mirrors = artifact
            .mirrors
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty());
        for (position, url) in mirrors.enumerate() {
            tx.execute(
                "INSERT INTO mirrors (artifact_id, position, url) VALUES (?1, ?2, ?3)",
                params![id, position as i64, url],
            )?;
        }

        let taggings = [
            (TagContext::Tags, artifact.tag_list.clone()),
            (TagContext::Software, artifact.software_list.clone()),
            (TagContext::FileFormats, artifact.effective_format_list()),
        ];
        for (context, tags) in &taggings {
            for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                tx.execute(
                    "INSERT OR IGNORE INTO taggings (artifact_id, context, tag, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id, context.as_str(), tag, now],
                )?;
            }
        }

        tx.commit()?;
        debug!("Stored artifact {} ({})", id, artifact.name);

        self.get(id)?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Record the content digest of an artifact's file.
    ///
    /// Returns `false` if no artifact has that id.
    pub fn set_file_hash(&self, id: i64, hash: Option<&str>) -> Result<bool, StoreError> {
        let updated = self.conn.execute(
            "UPDATE artifacts SET file_hash = ?1 WHERE id = ?2",
            params![hash, id],
        )?;
        Ok(updated > 0)
    }

    /// Get an artifact by id
    pub fn get(&self, id: i64) -> Result<Option<Artifact>, StoreError> {
        let sql = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts a
             JOIN licenses l ON l.short_name = a.license
             WHERE a.id = ?1"
        );
        let row = self
            .conn
            .query_row(&sql, [id], ArtifactRow::from_row)
            .optional()?;

        row.map(|row| self.hydrate(row)).transpose()
    }

    /// Evaluate a query, in insertion order
    pub fn fetch(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StoreError> {
        let Some(filter) = query.to_sql() else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts a
             JOIN licenses l ON l.short_name = a.license
             {} ORDER BY a.id",
            filter.where_clause()
        );
        debug!("Fetching artifacts: {} {:?}", filter.where_clause(), filter.params);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(filter.params.iter()), ArtifactRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Count the artifacts a query matches
    pub fn count(&self, query: &ArtifactQuery) -> Result<usize, StoreError> {
        let Some(filter) = query.to_sql() else {
            return Ok(0);
        };

        let sql = format!(
            "SELECT COUNT(*) FROM artifacts a
             JOIN licenses l ON l.short_name = a.license
             {}",
            filter.where_clause()
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(filter.params.iter()), |row| row.get(0))?;
        Ok(count as usize)
    }

    // =========================================================================
    // Tag aggregation
    // =========================================================================

    /// Distinct tags of a context with usage counts, ordered by tag.
    ///
    /// With a filter, only tags containing it (case-insensitively) are listed.
    pub fn tag_counts(
        &self,
        context: TagContext,
        filter: Option<&str>,
    ) -> Result<Vec<TagCount>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT tag, COUNT(*) FROM taggings
             WHERE context = ?1 AND (?2 IS NULL OR instr(lower(tag), lower(?2)) > 0)
             GROUP BY tag ORDER BY tag",
        )?;
        let counts = stmt
            .query_map(params![context.as_str(), filter], |row| {
                Ok(TagCount {
                    name: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// Distinct tags of a context, most recently applied first
    pub fn recent_tags(&self, context: TagContext, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT tag FROM taggings WHERE context = ?1
             GROUP BY tag ORDER BY MAX(id) DESC LIMIT ?2",
        )?;
        let tags = stmt
            .query_map(params![context.as_str(), limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    fn hydrate(&self, row: ArtifactRow) -> Result<Artifact, StoreError> {
        let mut mirrors_stmt = self
            .conn
            .prepare_cached("SELECT url FROM mirrors WHERE artifact_id = ?1 ORDER BY position")?;
        let mirrors = mirrors_stmt
            .query_map([row.id], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut tags_stmt = self
            .conn
            .prepare_cached("SELECT context, tag FROM taggings WHERE artifact_id = ?1 ORDER BY id")?;
        let taggings = tags_stmt
            .query_map([row.id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let list = |context: TagContext| -> Vec<String> {
            taggings
                .iter()
                .filter(|(c, _)| c == context.as_str())
                .map(|(_, tag)| tag.clone())
                .collect()
        };

        Ok(Artifact {
            id: row.id,
            name: row.name,
            author: row.author,
            description: row.description,
            file: row.file_name.map(StoredFile::new),
            mirrors,
            file_format_list: list(TagContext::FileFormats),
            tag_list: list(TagContext::Tags),
            software_list: list(TagContext::Software),
            file_hash: row.file_hash,
            license: row.license,
            created_at: row.created_at,
        })
    }
}

/// Scalar columns of one artifact, before its lists are loaded
struct ArtifactRow {
    id: i64,
    name: String,
    author: String,
    description: String,
    file_name: Option<String>,
    file_hash: Option<String>,
    created_at: DateTime<Utc>,
    license: License,
}

impl ArtifactRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
            file_name: row.get(4)?,
            file_hash: row.get(5)?,
            created_at: row.get(6)?,
            license: License::new(row.get::<_, String>(7)?, row.get::<_, String>(8)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search;

    fn store() -> ArtifactStore {
        let store = ArtifactStore::open_in_memory().unwrap();
        for license in License::defaults() {
            store.add_license(&license).unwrap();
        }
        store
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = store();
        let artifact = store
            .insert(
                &NewArtifact::new("Drum package", "Drumbrum", "by-sa")
                    .with_description("A drumkit")
                    .with_tags(["drums", "samples"])
                    .with_software(["hydrogen"])
                    .with_file_formats(["rar"])
                    .with_mirror("https://example.com/drums.rar"),
            )
            .unwrap();

        assert_eq!(artifact.name, "Drum package");
        assert_eq!(artifact.license.short_name, "by-sa");
        assert_eq!(artifact.tag_list, vec!["drums", "samples"]);
        assert_eq!(artifact.software_list, vec!["hydrogen"]);
        assert_eq!(artifact.file_format_list, vec!["rar"]);
        assert_eq!(artifact.mirrors, vec!["https://example.com/drums.rar"]);
        assert_eq!(store.get(artifact.id).unwrap(), Some(artifact));
    }

    #[test]
    fn test_insert_unknown_license() {
        let mut store = store();
        let result = store.insert(&NewArtifact::new("Thing", "Someone", "wubalubadubadub"));
        assert!(matches!(result, Err(StoreError::UnknownLicense(code)) if code == "wubalubadubadub"));
        assert_eq!(store.count(&ArtifactQuery::all()).unwrap(), 0);
    }

    #[test]
    fn test_file_extension_becomes_declared_format() {
        let mut store = store();
        let artifact = store
            .insert(&NewArtifact::new("Kit", "Someone", "by").with_file("drumkit.h2drumkit"))
            .unwrap();

        assert_eq!(
            artifact.file,
            Some(StoredFile::new("drumkit.h2drumkit"))
        );
        assert_eq!(artifact.file_format_list, vec!["h2drumkit"]);
    }

    #[test]
    fn test_add_license_is_idempotent() {
        let store = store();
        assert!(!store.add_license(&License::new("by", "Other name")).unwrap());
        assert_eq!(
            store.license("by").unwrap().unwrap().name,
            "Creative Commons Attribution 4.0"
        );
        assert!(store.license("nope").unwrap().is_none());
    }

    #[test]
    fn test_void_query_never_matches() {
        let mut store = store();
        store
            .insert(&NewArtifact::new("Thing", "Someone", "by"))
            .unwrap();

        assert!(store.fetch(&ArtifactQuery::none()).unwrap().is_empty());
        assert_eq!(store.count(&ArtifactQuery::none()).unwrap(), 0);
        assert_eq!(store.count(&ArtifactQuery::all()).unwrap(), 1);
    }

    #[test]
    fn test_tags_match_case_insensitively() {
        let mut store = store();
        store
            .insert(&NewArtifact::new("Thing", "Someone", "by").with_tags(["Guitar"]))
            .unwrap();

        let query = search::artifacts_tagged_with(&ArtifactQuery::all(), Some("guitar"));
        assert_eq!(store.count(&query).unwrap(), 1);
    }

    #[test]
    fn test_tag_counts_and_recent() {
        let mut store = store();
        store
            .insert(&NewArtifact::new("One", "A", "by").with_tags(["samples", "drums"]))
            .unwrap();
        store
            .insert(&NewArtifact::new("Two", "B", "by").with_tags(["samples", "synth"]))
            .unwrap();

        let counts = store.tag_counts(TagContext::Tags, None).unwrap();
        assert_eq!(
            counts,
            vec![
                TagCount { name: "drums".to_string(), count: 1 },
                TagCount { name: "samples".to_string(), count: 2 },
                TagCount { name: "synth".to_string(), count: 1 },
            ]
        );

        let filtered = store.tag_counts(TagContext::Tags, Some("SYN")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "synth");

        let recent = store.recent_tags(TagContext::Tags, 2).unwrap();
        assert_eq!(recent, vec!["synth", "samples"]);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("catalog.sqlite3");

        {
            let mut store = ArtifactStore::open(&path).unwrap();
            store.add_license(&License::new("by", "Attribution")).unwrap();
            store
                .insert(&NewArtifact::new("Kept", "Someone", "by"))
                .unwrap();
        }

        let store = ArtifactStore::open(&path).unwrap();
        let all = store.fetch(&ArtifactQuery::all()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Kept");
    }
}
