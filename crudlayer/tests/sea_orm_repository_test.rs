use crudlayer::pagination::SortOrder;
use crudlayer::{CrudError, CrudRepository, Pageable, Sort};
use sea_orm::{EntityTrait, PaginatorTrait};

mod common;
use common::note_entity::Note;
use common::{note_repository, setup_test_db};

#[tokio::test]
async fn test_save_inserts_then_updates() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let repository = note_repository(&db);

    let inserted = repository.save(Note::titled("first")).await.unwrap();
    assert_eq!(inserted.id, Some(1));
    assert_eq!(inserted.body, None);

    let mut changed = inserted.clone();
    changed.body = Some("now with a body".to_string());
    let updated = repository.save(changed).await.unwrap();
    assert_eq!(updated.id, Some(1));
    assert_eq!(updated.body.as_deref(), Some("now with a body"));

    let found = repository.find_by_id(&1).await.unwrap().unwrap();
    assert_eq!(found, updated);
}

#[tokio::test]
async fn test_find_by_id_missing() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let repository = note_repository(&db);
    assert!(repository.find_by_id(&42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_of_missing_row_is_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let repository = note_repository(&db);

    let ghost = Note {
        id: Some(99),
        title: Some("ghost".to_string()),
        body: None,
    };
    let err = repository.save(ghost).await.unwrap_err();
    assert!(matches!(err, CrudError::NotFound { .. }));
}

#[tokio::test]
async fn test_duplicate_title_is_conflict() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let repository = note_repository(&db);

    repository.save(Note::titled("unique")).await.unwrap();
    let err = repository.save(Note::titled("unique")).await.unwrap_err();
    assert!(matches!(err, CrudError::Conflict { .. }));
}

#[tokio::test]
async fn test_find_all_pages_in_primary_key_order() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    common::seed_notes(&db, &["c", "a", "e", "b", "d"]).await;
    let repository = note_repository(&db);

    let page = repository.find_all(&Pageable::of(1, 2)).await.unwrap();

    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
    let titles: Vec<_> = page.content.iter().filter_map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["e", "b"]);
}

#[tokio::test]
async fn test_find_all_past_last_page_is_empty() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    common::seed_notes(&db, &["a", "b", "c"]).await;
    let repository = note_repository(&db);

    let beyond = repository.find_all(&Pageable::of(5, 2)).await.unwrap();
    assert!(beyond.content.is_empty());
    assert_eq!(beyond.total_elements, 3);

    // The offset of this page does not fit in a u64
    let huge = repository.find_all(&Pageable::of(u64::MAX, 20)).await.unwrap();
    assert!(huge.content.is_empty());
    assert_eq!(huge.page, u64::MAX);
    assert_eq!(huge.total_elements, 3);

    let rows = common::note_entity::Entity::find()
        .count(repository.connection())
        .await
        .unwrap();
    assert_eq!(rows, 3);
}

#[tokio::test]
async fn test_find_all_sorted_and_unknown_columns_ignored() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    common::seed_notes(&db, &["c", "a", "b"]).await;
    let repository = note_repository(&db);

    let pageable = Pageable::unpaged().with_sort(Sort::by(vec![
        SortOrder::desc("no_such_column"),
        SortOrder::asc("title"),
    ]));
    let page = repository.find_all(&pageable).await.unwrap();

    let titles: Vec<_> = page.content.iter().filter_map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_delete() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let created = common::seed_notes(&db, &["doomed"]).await;
    let repository = note_repository(&db);

    repository.delete(created[0].clone()).await.unwrap();
    assert!(repository.find_by_id(&1).await.unwrap().is_none());

    let err = repository.delete(created[0].clone()).await.unwrap_err();
    assert!(matches!(err, CrudError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_without_id() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let repository = note_repository(&db);
    let err = repository.delete(Note::titled("nobody")).await.unwrap_err();
    assert!(matches!(err, CrudError::Delete { .. }));
}
