//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - `tags.name` is unique and compared case-sensitively.
//! - "In use" means at least one `task_tags` row references the tag. It is
//!   always queried, never inferred from a loaded association.
//! - Forced deletes remove the tag's `task_tags` rows, never the tasks.

use crate::model::tag::{TagCreateInput, TagId, TagUpdateInput, TagView};
use crate::repo::{begin_write, ensure_schema, exists_by_id, log_outcome, RepoResult, Response};
use rusqlite::{params, Connection, OptionalExtension};

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("tags", &["id", "name"]),
    ("task_tags", &["task_id", "tag_id"]),
];

const TAG_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1);";
const TAG_IN_USE_SQL: &str = "SELECT EXISTS(SELECT 1 FROM task_tags WHERE tag_id = ?1);";

/// Repository interface for tag CRUD operations.
pub trait TagRepository {
    /// Creates a tag.
    ///
    /// When the name already exists nothing is written and the result is
    /// `Conflict` carrying the existing tag's id.
    fn create_tag(&self, input: &TagCreateInput) -> RepoResult<(Response, TagId)>;
    fn read_tag(&self, id: TagId) -> RepoResult<Option<TagView>>;
    fn read_all_tags(&self) -> RepoResult<Vec<TagView>>;
    fn update_tag(&self, input: &TagUpdateInput) -> RepoResult<Response>;
    /// Deletes a tag; `Conflict` while attached to any task unless `force`.
    fn delete_tag(&self, id: TagId, force: bool) -> RepoResult<Response>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, input: &TagCreateInput) -> RepoResult<(Response, TagId)> {
        input.validate()?;

        let tx = begin_write(self.conn)?;
        if let Some(existing) = find_tag_id_by_name(&tx, &input.name)? {
            log_outcome("tag_create", Response::Conflict, existing);
            return Ok((Response::Conflict, existing));
        }

        tx.execute(
            "INSERT INTO tags (name) VALUES (?1);",
            [input.name.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        log_outcome("tag_create", Response::Created, id);
        Ok((Response::Created, id))
    }

    fn read_tag(&self, id: TagId) -> RepoResult<Option<TagView>> {
        let tag = self
            .conn
            .query_row("SELECT id, name FROM tags WHERE id = ?1;", [id], |row| {
                Ok(TagView {
                    id: row.get("id")?,
                    name: row.get("name")?,
                })
            })
            .optional()?;
        Ok(tag)
    }

    fn read_all_tags(&self) -> RepoResult<Vec<TagView>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(TagView {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }

    fn update_tag(&self, input: &TagUpdateInput) -> RepoResult<Response> {
        input.validate()?;

        let tx = begin_write(self.conn)?;
        if !exists_by_id(&tx, TAG_EXISTS_SQL, input.id)? {
            log_outcome("tag_update", Response::NotFound, input.id);
            return Ok(Response::NotFound);
        }

        let name_owner = find_tag_id_by_name(&tx, &input.name)?;
        if name_owner.is_some_and(|owner| owner != input.id) {
            log_outcome("tag_update", Response::Conflict, input.id);
            return Ok(Response::Conflict);
        }

        tx.execute(
            "UPDATE tags SET name = ?1 WHERE id = ?2;",
            params![input.name.as_str(), input.id],
        )?;
        tx.commit()?;

        log_outcome("tag_update", Response::Updated, input.id);
        Ok(Response::Updated)
    }

    fn delete_tag(&self, id: TagId, force: bool) -> RepoResult<Response> {
        let tx = begin_write(self.conn)?;
        let response = if !exists_by_id(&tx, TAG_EXISTS_SQL, id)? {
            Response::NotFound
        } else if !force && exists_by_id(&tx, TAG_IN_USE_SQL, id)? {
            Response::Conflict
        } else {
            tx.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
            tx.commit()?;
            Response::Deleted
        };

        log_outcome("tag_delete", response, id);
        Ok(response)
    }
}

fn find_tag_id_by_name(conn: &Connection, name: &str) -> RepoResult<Option<TagId>> {
    let id = conn
        .query_row("SELECT id FROM tags WHERE name = ?1;", [name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}
