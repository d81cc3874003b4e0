use kanban_core::db::open_db_in_memory;
use kanban_core::{
    RepoError, Response, SqliteTagRepository, SqliteTaskRepository, TagCreateInput,
    TagRepository, TagUpdateInput, TagView, TaskCreateInput, TaskRepository,
};
use rusqlite::Connection;

fn seeded() -> (Connection, [i64; 3]) {
    let conn = open_db_in_memory().unwrap();
    let ids = {
        let repo = SqliteTagRepository::try_new(&conn).unwrap();
        ["Cleaning", "Urgent", "TBD"].map(|name| {
            let (response, id) = repo.create_tag(&TagCreateInput::new(name)).unwrap();
            assert_eq!(response, Response::Created);
            id
        })
    };
    (conn, ids)
}

#[test]
fn create_then_read_roundtrip() {
    let (conn, _) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let (response, id) = repo.create_tag(&TagCreateInput::new("Garden")).unwrap();
    assert_eq!(response, Response::Created);
    assert_eq!(
        repo.read_tag(id).unwrap(),
        Some(TagView {
            id,
            name: "Garden".to_string(),
        })
    );
}

#[test]
fn create_existing_name_returns_conflict_with_existing_id() {
    let (conn, [cleaning, _, _]) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let (response, id) = repo.create_tag(&TagCreateInput::new("Cleaning")).unwrap();
    assert_eq!(response, Response::Conflict);
    assert_eq!(id, cleaning);
    assert_eq!(repo.read_all_tags().unwrap().len(), 3);
}

#[test]
fn create_rejects_names_over_fifty_chars() {
    let (conn, _) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let err = repo
        .create_tag(&TagCreateInput::new("x".repeat(51)))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn read_missing_tag_returns_none() {
    let (conn, _) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    assert_eq!(repo.read_tag(404).unwrap(), None);
}

#[test]
fn read_all_returns_every_tag() {
    let (conn, [cleaning, urgent, tbd]) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let tags = repo.read_all_tags().unwrap();
    assert_eq!(
        tags,
        vec![
            TagView {
                id: cleaning,
                name: "Cleaning".to_string()
            },
            TagView {
                id: urgent,
                name: "Urgent".to_string()
            },
            TagView {
                id: tbd,
                name: "TBD".to_string()
            },
        ]
    );
}

#[test]
fn update_renames_tag() {
    let (conn, [cleaning, _, _]) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let response = repo
        .update_tag(&TagUpdateInput {
            id: cleaning,
            name: "Tidying".to_string(),
        })
        .unwrap();
    assert_eq!(response, Response::Updated);
    assert_eq!(repo.read_tag(cleaning).unwrap().unwrap().name, "Tidying");
}

#[test]
fn update_to_own_name_is_updated() {
    let (conn, [cleaning, _, _]) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let response = repo
        .update_tag(&TagUpdateInput {
            id: cleaning,
            name: "Cleaning".to_string(),
        })
        .unwrap();
    assert_eq!(response, Response::Updated);
}

#[test]
fn update_to_name_of_another_tag_returns_conflict() {
    let (conn, [cleaning, _, _]) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let response = repo
        .update_tag(&TagUpdateInput {
            id: cleaning,
            name: "Urgent".to_string(),
        })
        .unwrap();
    assert_eq!(response, Response::Conflict);
    assert_eq!(repo.read_tag(cleaning).unwrap().unwrap().name, "Cleaning");
}

#[test]
fn update_missing_tag_returns_not_found() {
    let (conn, _) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    let response = repo
        .update_tag(&TagUpdateInput {
            id: 404,
            name: "Urgent".to_string(),
        })
        .unwrap();
    assert_eq!(response, Response::NotFound);
}

#[test]
fn delete_unused_tag() {
    let (conn, [_, _, tbd]) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();

    assert_eq!(repo.delete_tag(tbd, false).unwrap(), Response::Deleted);
    assert_eq!(repo.read_tag(tbd).unwrap(), None);
}

#[test]
fn delete_missing_tag_returns_not_found() {
    let (conn, _) = seeded();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    assert_eq!(repo.delete_tag(404, false).unwrap(), Response::NotFound);
}

#[test]
fn delete_tag_in_use_requires_force_and_keeps_task() {
    let (conn, [cleaning, _, _]) = seeded();
    let tags = SqliteTagRepository::try_new(&conn).unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let (_, task_id) = tasks
        .create_task(&TaskCreateInput {
            tags: Some(vec!["Cleaning".to_string(), "Urgent".to_string()]),
            ..TaskCreateInput::new("Clean Office")
        })
        .unwrap();

    assert_eq!(tags.delete_tag(cleaning, false).unwrap(), Response::Conflict);
    assert!(tags.read_tag(cleaning).unwrap().is_some());

    assert_eq!(tags.delete_tag(cleaning, true).unwrap(), Response::Deleted);
    let task = tasks.read_task(task_id).unwrap().unwrap();
    assert_eq!(task.tags, vec!["Urgent".to_string()]);
}
