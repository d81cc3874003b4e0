//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Enforce unique titles and assignee existence on create/update.
//! - Resolve tag names into `task_tags` links.
//! - Map delete requests onto the task lifecycle.
//!
//! # Invariants
//! - Title uniqueness is checked here; the store does not enforce it.
//! - Tag names resolve by exact, case-sensitive match. Unknown names are
//!   dropped; tags are never created implicitly.
//! - Delete: `New` rows are removed, `Active` rows become `Removed`,
//!   `Resolved`/`Closed`/`Removed` rows are left untouched.

use crate::model::task::{
    TaskCreateInput, TaskDetails, TaskId, TaskState, TaskSummary, TaskUpdateInput,
};
use crate::model::user::UserId;
use crate::model::INVALID_ID;
use crate::repo::{
    begin_write, ensure_schema, exists_by_id, log_outcome, now_millis, utc_from_millis,
    RepoError, RepoResult, Response,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "tasks",
        &[
            "id",
            "title",
            "description",
            "assigned_to_id",
            "state",
            "created_at",
            "state_updated_at",
        ],
    ),
    ("task_tags", &["task_id", "tag_id"]),
    ("tags", &["id", "name"]),
    ("users", &["id", "name"]),
];

const TASK_SUMMARY_SELECT_SQL: &str = "SELECT
    t.id,
    t.title,
    u.name AS assigned_to_name,
    t.state
FROM tasks t
LEFT JOIN users u ON u.id = t.assigned_to_id";

const TASK_DETAILS_SELECT_SQL: &str = "SELECT
    t.id,
    t.title,
    t.description,
    t.created_at,
    u.name AS assigned_to_name,
    t.state,
    t.state_updated_at
FROM tasks t
LEFT JOIN users u ON u.id = t.assigned_to_id";

const TASK_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1);";
const USER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);";

/// Repository interface for task CRUD and lifecycle operations.
///
/// List methods return summaries ordered by task id.
pub trait TaskRepository {
    /// Creates a task in state `New`.
    ///
    /// Returns `Conflict` with the existing id when the title is taken, and
    /// `BadRequest` with `INVALID_ID` when `assigned_to_id` names no user.
    /// Tag names without a matching tag are silently ignored.
    fn create_task(&self, input: &TaskCreateInput) -> RepoResult<(Response, TaskId)>;
    fn read_task(&self, id: TaskId) -> RepoResult<Option<TaskDetails>>;
    fn read_all_tasks(&self) -> RepoResult<Vec<TaskSummary>>;
    fn read_all_tasks_by_state(&self, state: TaskState) -> RepoResult<Vec<TaskSummary>>;
    /// Tasks carrying a tag whose name equals `tag_name` exactly.
    fn read_all_tasks_by_tag(&self, tag_name: &str) -> RepoResult<Vec<TaskSummary>>;
    fn read_all_tasks_by_user(&self, user_id: UserId) -> RepoResult<Vec<TaskSummary>>;
    fn read_all_removed_tasks(&self) -> RepoResult<Vec<TaskSummary>>;
    /// Updates a task.
    ///
    /// Checks run in order: `NotFound`, `Conflict` on a title held by
    /// another task, `BadRequest` on an unknown assignee. A supplied tag
    /// list replaces the whole tag set; names without a matching tag are
    /// silently ignored. `state_updated` is always refreshed.
    fn update_task(&self, input: &TaskUpdateInput) -> RepoResult<Response>;
    /// Applies the delete transition for the task's current state.
    fn delete_task(&self, id: TaskId) -> RepoResult<Response>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }

    fn list_tasks(&self, filter: TaskFilter<'_>) -> RepoResult<Vec<TaskSummary>> {
        let mut sql = format!("{TASK_SUMMARY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match filter {
            TaskFilter::All => {}
            TaskFilter::State(state) => {
                sql.push_str(" AND t.state = ?");
                bind_values.push(Value::Text(state.as_str().to_string()));
            }
            TaskFilter::Tag(name) => {
                sql.push_str(
                    " AND EXISTS (
                        SELECT 1
                        FROM task_tags tt
                        INNER JOIN tags g ON g.id = tt.tag_id
                        WHERE tt.task_id = t.id
                          AND g.name = ?
                    )",
                );
                bind_values.push(Value::Text(name.to_string()));
            }
            TaskFilter::User(user_id) => {
                sql.push_str(" AND t.assigned_to_id = ?");
                bind_values.push(Value::Integer(user_id));
            }
        }

        sql.push_str(" ORDER BY t.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_summary_row(self.conn, row)?);
        }
        Ok(tasks)
    }
}

#[derive(Debug, Clone, Copy)]
enum TaskFilter<'a> {
    All,
    State(TaskState),
    Tag(&'a str),
    User(UserId),
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, input: &TaskCreateInput) -> RepoResult<(Response, TaskId)> {
        input.validate()?;

        let tx = begin_write(self.conn)?;
        if let Some(existing) = find_task_id_by_title(&tx, &input.title, None)? {
            log_outcome("task_create", Response::Conflict, existing);
            return Ok((Response::Conflict, existing));
        }
        if let Some(user_id) = input.assigned_to_id {
            if !exists_by_id(&tx, USER_EXISTS_SQL, user_id)? {
                log_outcome("task_create", Response::BadRequest, INVALID_ID);
                return Ok((Response::BadRequest, INVALID_ID));
            }
        }

        let now = now_millis();
        tx.execute(
            "INSERT INTO tasks (
                title,
                description,
                assigned_to_id,
                state,
                created_at,
                state_updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                input.title.as_str(),
                input.description.as_deref(),
                input.assigned_to_id,
                TaskState::New.as_str(),
                now,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();
        if let Some(tags) = input.tags.as_deref() {
            link_tags_by_name(&tx, id, tags)?;
        }
        tx.commit()?;

        log_outcome("task_create", Response::Created, id);
        Ok((Response::Created, id))
    }

    fn read_task(&self, id: TaskId) -> RepoResult<Option<TaskDetails>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_DETAILS_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_details_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn read_all_tasks(&self) -> RepoResult<Vec<TaskSummary>> {
        self.list_tasks(TaskFilter::All)
    }

    fn read_all_tasks_by_state(&self, state: TaskState) -> RepoResult<Vec<TaskSummary>> {
        self.list_tasks(TaskFilter::State(state))
    }

    fn read_all_tasks_by_tag(&self, tag_name: &str) -> RepoResult<Vec<TaskSummary>> {
        self.list_tasks(TaskFilter::Tag(tag_name))
    }

    fn read_all_tasks_by_user(&self, user_id: UserId) -> RepoResult<Vec<TaskSummary>> {
        self.list_tasks(TaskFilter::User(user_id))
    }

    fn read_all_removed_tasks(&self) -> RepoResult<Vec<TaskSummary>> {
        self.list_tasks(TaskFilter::State(TaskState::Removed))
    }

    fn update_task(&self, input: &TaskUpdateInput) -> RepoResult<Response> {
        input.validate()?;

        let tx = begin_write(self.conn)?;
        if !exists_by_id(&tx, TASK_EXISTS_SQL, input.id)? {
            log_outcome("task_update", Response::NotFound, input.id);
            return Ok(Response::NotFound);
        }
        if find_task_id_by_title(&tx, &input.title, Some(input.id))?.is_some() {
            log_outcome("task_update", Response::Conflict, input.id);
            return Ok(Response::Conflict);
        }
        if let Some(user_id) = input.assigned_to_id {
            if !exists_by_id(&tx, USER_EXISTS_SQL, user_id)? {
                log_outcome("task_update", Response::BadRequest, input.id);
                return Ok(Response::BadRequest);
            }
        }

        tx.execute(
            "UPDATE tasks
             SET
                title = ?1,
                state = ?2,
                state_updated_at = ?3,
                assigned_to_id = COALESCE(?4, assigned_to_id),
                description = COALESCE(?5, description)
             WHERE id = ?6;",
            params![
                input.title.as_str(),
                input.state.as_str(),
                now_millis(),
                input.assigned_to_id,
                input.description.as_deref(),
                input.id,
            ],
        )?;
        if let Some(tags) = input.tags.as_deref() {
            tx.execute("DELETE FROM task_tags WHERE task_id = ?1;", [input.id])?;
            link_tags_by_name(&tx, input.id, tags)?;
        }
        tx.commit()?;

        log_outcome("task_update", Response::Updated, input.id);
        Ok(Response::Updated)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<Response> {
        let tx = begin_write(self.conn)?;
        let state_text: Option<String> = tx
            .query_row("SELECT state FROM tasks WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(state_text) = state_text else {
            log_outcome("task_delete", Response::NotFound, id);
            return Ok(Response::NotFound);
        };

        let response = match parse_state(&state_text)? {
            TaskState::New => {
                tx.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
                Response::Deleted
            }
            TaskState::Active => {
                tx.execute(
                    "UPDATE tasks SET state = ?1, state_updated_at = ?2 WHERE id = ?3;",
                    params![TaskState::Removed.as_str(), now_millis(), id],
                )?;
                Response::Updated
            }
            TaskState::Resolved | TaskState::Closed | TaskState::Removed => Response::Conflict,
        };
        tx.commit()?;

        log_outcome("task_delete", response, id);
        Ok(response)
    }
}

fn find_task_id_by_title(
    conn: &Connection,
    title: &str,
    excluding: Option<TaskId>,
) -> RepoResult<Option<TaskId>> {
    let id = conn
        .query_row(
            "SELECT id
             FROM tasks
             WHERE title = ?1
               AND (?2 IS NULL OR id <> ?2)
             ORDER BY id ASC
             LIMIT 1;",
            params![title, excluding],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn link_tags_by_name(conn: &Connection, task_id: TaskId, names: &[String]) -> RepoResult<()> {
    for name in names {
        conn.execute(
            "INSERT OR IGNORE INTO task_tags (task_id, tag_id)
             SELECT ?1, id
             FROM tags
             WHERE name = ?2;",
            params![task_id, name.as_str()],
        )?;
    }
    Ok(())
}

fn load_tag_names(conn: &Connection, task_id: TaskId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT g.name
         FROM task_tags tt
         INNER JOIN tags g ON g.id = tt.tag_id
         WHERE tt.task_id = ?1
         ORDER BY g.name ASC;",
    )?;
    let names = stmt
        .query_map([task_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn parse_task_summary_row(conn: &Connection, row: &Row<'_>) -> RepoResult<TaskSummary> {
    let id: TaskId = row.get("id")?;
    let state_text: String = row.get("state")?;
    Ok(TaskSummary {
        id,
        title: row.get("title")?,
        assigned_to_name: row.get("assigned_to_name")?,
        tags: load_tag_names(conn, id)?,
        state: parse_state(&state_text)?,
    })
}

fn parse_task_details_row(conn: &Connection, row: &Row<'_>) -> RepoResult<TaskDetails> {
    let id: TaskId = row.get("id")?;
    let state_text: String = row.get("state")?;
    Ok(TaskDetails {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        created: utc_from_millis(row.get("created_at")?, "tasks.created_at")?,
        assigned_to_name: row.get("assigned_to_name")?,
        tags: load_tag_names(conn, id)?,
        state: parse_state(&state_text)?,
        state_updated: utc_from_millis(row.get("state_updated_at")?, "tasks.state_updated_at")?,
    })
}

fn parse_state(value: &str) -> RepoResult<TaskState> {
    value
        .parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid task state `{value}` in tasks.state")))
}
