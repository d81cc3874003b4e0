//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `users.email` is unique and compared case-sensitively.
//! - A user with assigned tasks is only deleted when forced; forced deletes
//!   detach the tasks (`assigned_to_id` becomes NULL).

use crate::model::user::{UserCreateInput, UserId, UserUpdateInput, UserView};
use crate::model::INVALID_ID;
use crate::repo::{begin_write, ensure_schema, exists_by_id, log_outcome, RepoResult, Response};
use rusqlite::{params, Connection, OptionalExtension};

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("users", &["id", "name", "email"]),
    ("tasks", &["assigned_to_id"]),
];

const USER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);";
const USER_HAS_TASKS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE assigned_to_id = ?1);";

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Creates a user; returns `Conflict` with `INVALID_ID` when the email is taken.
    fn create_user(&self, input: &UserCreateInput) -> RepoResult<(Response, UserId)>;
    fn read_user(&self, id: UserId) -> RepoResult<Option<UserView>>;
    fn read_all_users(&self) -> RepoResult<Vec<UserView>>;
    /// Overwrites name and email.
    ///
    /// Returns `Conflict` when a different user owns the email, checked
    /// before existence, then `NotFound` when `input.id` is unknown.
    fn update_user(&self, input: &UserUpdateInput) -> RepoResult<Response>;
    /// Deletes a user; `Conflict` while tasks are assigned unless `force`.
    fn delete_user(&self, id: UserId, force: bool) -> RepoResult<Response>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, input: &UserCreateInput) -> RepoResult<(Response, UserId)> {
        input.validate()?;

        let tx = begin_write(self.conn)?;
        if find_user_id_by_email(&tx, &input.email)?.is_some() {
            log_outcome("user_create", Response::Conflict, INVALID_ID);
            return Ok((Response::Conflict, INVALID_ID));
        }

        tx.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2);",
            params![input.name.as_str(), input.email.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        log_outcome("user_create", Response::Created, id);
        Ok((Response::Created, id))
    }

    fn read_user(&self, id: UserId) -> RepoResult<Option<UserView>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, email FROM users WHERE id = ?1;",
                [id],
                |row| {
                    Ok(UserView {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        email: row.get("email")?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn read_all_users(&self) -> RepoResult<Vec<UserView>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email FROM users ORDER BY id ASC;")?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserView {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    email: row.get("email")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn update_user(&self, input: &UserUpdateInput) -> RepoResult<Response> {
        input.validate()?;

        let tx = begin_write(self.conn)?;
        let email_owner = find_user_id_by_email(&tx, &input.email)?;
        if email_owner.is_some_and(|owner| owner != input.id) {
            log_outcome("user_update", Response::Conflict, input.id);
            return Ok(Response::Conflict);
        }

        let changed = tx.execute(
            "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3;",
            params![input.name.as_str(), input.email.as_str(), input.id],
        )?;
        if changed == 0 {
            log_outcome("user_update", Response::NotFound, input.id);
            return Ok(Response::NotFound);
        }
        tx.commit()?;

        log_outcome("user_update", Response::Updated, input.id);
        Ok(Response::Updated)
    }

    fn delete_user(&self, id: UserId, force: bool) -> RepoResult<Response> {
        let tx = begin_write(self.conn)?;
        let response = if !exists_by_id(&tx, USER_EXISTS_SQL, id)? {
            Response::NotFound
        } else if !force && exists_by_id(&tx, USER_HAS_TASKS_SQL, id)? {
            Response::Conflict
        } else {
            tx.execute("DELETE FROM users WHERE id = ?1;", [id])?;
            tx.commit()?;
            Response::Deleted
        };

        log_outcome("user_delete", response, id);
        Ok(response)
    }
}

fn find_user_id_by_email(conn: &Connection, email: &str) -> RepoResult<Option<UserId>> {
    let id = conn
        .query_row("SELECT id FROM users WHERE email = ?1;", [email], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}
