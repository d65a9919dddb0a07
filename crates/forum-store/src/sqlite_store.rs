use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use forum_tags::{
    ContentId, ContentStore, FacetQuery, NestedTag, SeedReport, StoreError, TagId, TagRecord,
    TagStore,
};
use rusqlite::{params, Connection, OptionalExtension};

use crate::sql_query::compile_facet_query;

struct StaleTag {
    id: String,
    name: String,
    lft: i64,
    rgt: i64,
    depth: i64,
    referenced: bool,
}

/// SQLite-backed implementation of the TagStore and ContentStore traits.
pub struct SqliteForumStore {
    conn: Mutex<Connection>,
}

impl SqliteForumStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        tracing::info!("Opened forum database at {:?}", path);
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                lft INTEGER NOT NULL,
                rgt INTEGER NOT NULL,
                depth INTEGER NOT NULL,
                CHECK (lft < rgt)
            );

            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                created INTEGER NOT NULL,
                quarantined INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS tags_to_posts (
                tag_id TEXT NOT NULL REFERENCES tags(id),
                post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                PRIMARY KEY (tag_id, post_id)
            );

            CREATE INDEX IF NOT EXISTS idx_tags_lft ON tags(lft);
            CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created);
            CREATE INDEX IF NOT EXISTS idx_tags_to_posts_post ON tags_to_posts(post_id);
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))
    }

    fn row_to_tag(row: &rusqlite::Row<'_>) -> Result<TagRecord, StoreError> {
        let id_str: String = row
            .get(0)
            .map_err(|e| StoreError::Storage(format!("row: {}", e)))?;
        let id = TagId::parse_str(&id_str)
            .map_err(|e| StoreError::Storage(format!("bad tag id {}: {}", id_str, e)))?;
        let depth: i64 = row
            .get(2)
            .map_err(|e| StoreError::Storage(format!("row: {}", e)))?;
        let depth = u32::try_from(depth)
            .map_err(|_| StoreError::Storage(format!("bad depth {} for tag {}", depth, id_str)))?;
        let tag = TagRecord {
            id,
            name: row
                .get(1)
                .map_err(|e| StoreError::Storage(format!("row: {}", e)))?,
            depth,
            lft: row
                .get(3)
                .map_err(|e| StoreError::Storage(format!("row: {}", e)))?,
            rgt: row
                .get(4)
                .map_err(|e| StoreError::Storage(format!("row: {}", e)))?,
        };
        tag.validate()?;
        Ok(tag)
    }

    fn collect_tags(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Vec<TagRecord>, StoreError> {
        let rows = stmt
            .query_map(params, |row| Ok(Self::row_to_tag(row)))
            .map_err(|e| StoreError::Storage(format!("query tags: {}", e)))?;

        let mut tags = Vec::new();
        for row_result in rows {
            let tag_result = row_result.map_err(|e| StoreError::Storage(format!("row: {}", e)))?;
            tags.push(tag_result?);
        }
        Ok(tags)
    }

    fn map_constraint(e: rusqlite::Error, what: String) -> StoreError {
        if let rusqlite::Error::SqliteFailure(ref err, _) = e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation {
                return StoreError::AlreadyExists(what);
            }
        }
        StoreError::Storage(format!("{}: {}", what, e))
    }

    /// Remove tags that are no longer in the batch.
    ///
    /// Tags still attached to content cannot be deleted; they are parked as
    /// disjoint leaf roots after the batch's last interval, in name order.
    fn retire_stale_tags(
        tx: &rusqlite::Transaction<'_>,
        batch: &[NestedTag],
        report: &mut SeedReport,
    ) -> Result<(), StoreError> {
        let names: HashSet<&str> = batch.iter().map(|t| t.name.as_str()).collect();
        let stale: Vec<StaleTag> = {
            let mut stmt = tx
                .prepare(
                    "SELECT t.id, t.name, t.lft, t.rgt, t.depth,
                            EXISTS (SELECT 1 FROM tags_to_posts tp WHERE tp.tag_id = t.id)
                     FROM tags t ORDER BY t.name",
                )
                .map_err(|e| StoreError::Storage(format!("prepare stale scan: {}", e)))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(StaleTag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        lft: row.get(2)?,
                        rgt: row.get(3)?,
                        depth: row.get(4)?,
                        referenced: row.get(5)?,
                    })
                })
                .map_err(|e| StoreError::Storage(format!("stale scan: {}", e)))?;
            let mut stale = Vec::new();
            for row in rows {
                let tag = row.map_err(|e| StoreError::Storage(format!("row: {}", e)))?;
                if !names.contains(tag.name.as_str()) {
                    stale.push(tag);
                }
            }
            stale
        };

        let mut next_slot = batch.iter().map(|t| t.rgt + 1).max().unwrap_or(0);
        for tag in stale {
            if !tag.referenced {
                tx.execute("DELETE FROM tags WHERE id = ?1", params![tag.id])
                    .map_err(|e| StoreError::Storage(format!("delete {}: {}", tag.name, e)))?;
                report.removed += 1;
                continue;
            }

            let (lft, rgt) = (next_slot, next_slot + 1);
            next_slot += 2;
            if (tag.lft, tag.rgt, tag.depth) == (lft, rgt, 0) {
                report.unchanged += 1;
                continue;
            }
            tx.execute(
                "UPDATE tags SET lft = ?1, rgt = ?2, depth = 0 WHERE id = ?3",
                params![lft, rgt, tag.id],
            )
            .map_err(|e| StoreError::Storage(format!("park {}: {}", tag.name, e)))?;
            tracing::warn!(tag = %tag.name, "Tag left the taxonomy but is still in use; parked as a root");
            report.parked += 1;
        }
        Ok(())
    }

    // ==================== Content Operations ====================

    /// Register a content row. Used by seeding tools and tests; posts are
    /// otherwise written by the forum's own CRUD layer.
    pub fn insert_content(&self, id: ContentId, created: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT INTO posts (id, created, quarantined) VALUES (?1, ?2, 0)",
            params![id.to_string(), created.timestamp_millis()],
        )
        .map_err(|e| Self::map_constraint(e, format!("post {}", id)))?;
        Ok(())
    }

    /// Hide or restore a content row from facet queries.
    pub fn set_quarantined(&self, id: ContentId, quarantined: bool) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE posts SET quarantined = ?1 WHERE id = ?2",
                params![quarantined as i32, id.to_string()],
            )
            .map_err(|e| StoreError::Storage(format!("quarantine: {}", e)))?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("post {}", id)));
        }
        Ok(())
    }

    /// Attach a tag to a content row. Attaching twice is a no-op.
    pub fn tag_content(&self, content: ContentId, tag: TagId) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT OR IGNORE INTO tags_to_posts (tag_id, post_id) VALUES (?1, ?2)",
            params![tag.to_string(), content.to_string()],
        )
        .map_err(|e| match Self::map_constraint(e, String::new()) {
            StoreError::AlreadyExists(_) => {
                StoreError::NotFound(format!("post {} or tag {}", content, tag))
            }
            other => other,
        })?;
        Ok(())
    }

    /// Tags attached to a content row, in `lft` order.
    pub fn content_tags(&self, content: ContentId) -> Result<Vec<TagRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT t.id, t.name, t.depth, t.lft, t.rgt
                 FROM tags t JOIN tags_to_posts tp ON tp.tag_id = t.id
                 WHERE tp.post_id = ?1 ORDER BY t.lft",
            )
            .map_err(|e| StoreError::Storage(format!("prepare content_tags: {}", e)))?;
        let content_id = content.to_string();
        Self::collect_tags(&mut stmt, &[&content_id as &dyn rusqlite::types::ToSql])
    }
}

impl TagStore for SqliteForumStore {
    fn list_all(&self) -> Result<Vec<TagRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT id, name, depth, lft, rgt FROM tags ORDER BY lft")
            .map_err(|e| StoreError::Storage(format!("prepare list_all: {}", e)))?;
        Self::collect_tags(&mut stmt, &[])
    }

    fn get_many(&self, ids: &[TagId]) -> Result<Vec<TagRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, depth, lft, rgt FROM tags WHERE id IN ({}) ORDER BY lft",
            placeholders
        );
        let id_strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let params_ref: Vec<&dyn rusqlite::types::ToSql> = id_strings
            .iter()
            .map(|p| p as &dyn rusqlite::types::ToSql)
            .collect();

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Storage(format!("prepare get_many: {}", e)))?;
        Self::collect_tags(&mut stmt, params_ref.as_slice())
    }

    fn bulk_upsert_by_name(&self, tags: &[NestedTag]) -> Result<SeedReport, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Storage(format!("begin tx: {}", e)))?;

        let mut report = SeedReport::default();
        for tag in tags {
            let existing: Option<(i64, i64, i64)> = tx
                .query_row(
                    "SELECT lft, rgt, depth FROM tags WHERE name = ?1",
                    params![tag.name],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
                .map_err(|e| StoreError::Storage(format!("lookup {}: {}", tag.name, e)))?;

            match existing {
                None => {
                    tx.execute(
                        "INSERT INTO tags (id, name, lft, rgt, depth) VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            TagId::new_v4().to_string(),
                            tag.name,
                            tag.lft,
                            tag.rgt,
                            tag.depth as i64
                        ],
                    )
                    .map_err(|e| Self::map_constraint(e, format!("tag {}", tag.name)))?;
                    report.inserted += 1;
                }
                Some((lft, rgt, depth))
                    if lft == tag.lft && rgt == tag.rgt && depth == tag.depth as i64 =>
                {
                    report.unchanged += 1;
                }
                Some(_) => {
                    tx.execute(
                        "UPDATE tags SET lft = ?1, rgt = ?2, depth = ?3 WHERE name = ?4",
                        params![tag.lft, tag.rgt, tag.depth as i64, tag.name],
                    )
                    .map_err(|e| StoreError::Storage(format!("update {}: {}", tag.name, e)))?;
                    report.updated += 1;
                }
            }
        }

        Self::retire_stale_tags(&tx, tags, &mut report)?;

        tx.commit()
            .map_err(|e| StoreError::Storage(format!("commit: {}", e)))?;
        Ok(report)
    }
}

impl ContentStore for SqliteForumStore {
    fn find_by_tag_facets(&self, query: &FacetQuery) -> Result<Vec<ContentId>, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let compiled = compile_facet_query(query);
        tracing::debug!(facets = query.facets.len(), sql = %compiled.sql, "facet query");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> = compiled
            .params
            .iter()
            .map(|p| p as &dyn rusqlite::types::ToSql)
            .collect();

        let mut stmt = conn.prepare(&compiled.sql).map_err(|e| {
            StoreError::Storage(format!("prepare facets: {} (sql: {})", e, compiled.sql))
        })?;

        let rows = stmt
            .query_map(params_ref.as_slice(), |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Storage(format!("query facets: {}", e)))?;

        let mut ids = Vec::new();
        for row_result in rows {
            let id_str = row_result.map_err(|e| StoreError::Storage(format!("row: {}", e)))?;
            let id = ContentId::parse_str(&id_str)
                .map_err(|e| StoreError::Storage(format!("bad post id {}: {}", id_str, e)))?;
            ids.push(id);
        }
        Ok(ids)
    }
}
