//! CLI smoke entry point.
//!
//! Opens an in-memory store, seeds one task per lifecycle path and prints
//! the outcomes, so core wiring can be checked without a host application.

use kanban_core::db::migrations::latest_version;
use kanban_core::db::open_db_in_memory;
use kanban_core::{
    RepoError, SqliteTaskRepository, TaskCreateInput, TaskRepository, TaskState, TaskUpdateInput,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("kanban_core ping={}", kanban_core::ping());
    println!("kanban_core version={}", kanban_core::core_version());
    println!("kanban_core schema_version={}", latest_version());

    match delete_probe() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kanban_core probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn delete_probe() -> Result<(), RepoError> {
    let conn = open_db_in_memory()?;
    let tasks = SqliteTaskRepository::try_new(&conn)?;

    let (_, fresh_id) = tasks.create_task(&TaskCreateInput::new("probe new"))?;
    let (_, active_id) = tasks.create_task(&TaskCreateInput::new("probe active"))?;
    tasks.update_task(&TaskUpdateInput::new(active_id, "probe active", TaskState::Active))?;

    println!("delete new task -> {}", tasks.delete_task(fresh_id)?);
    println!("delete active task -> {}", tasks.delete_task(active_id)?);
    println!("delete removed task -> {}", tasks.delete_task(active_id)?);
    println!("removed tasks={}", tasks.read_all_removed_tasks()?.len());
    Ok(())
}
