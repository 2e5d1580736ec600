use std::sync::{Arc, Mutex};

use crudlayer::{
    CrudAction, CrudError, CrudService, DtoCrudService, FnConverter, Joinpoint, ListenerContext,
    Pageable, SelfValidation, Validatable, ValidationErrors, ValidationProfile,
};
use crudlayer::validation::validators::validate_length;

mod common;
use common::note_entity::{Note, NoteDto, NoteDtoConverter};
use common::{note_repository, setup_test_db};

impl Validatable for NoteDto {
    fn validate(&self, _profile: ValidationProfile) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(content) = &self.content {
            errors.check(validate_length("body", content, None, Some(20)));
        }
        errors.result()
    }
}

fn dto_service(
    db: &sea_orm::DatabaseConnection,
    listeners: ListenerContext,
) -> DtoCrudService<NoteDto, Note> {
    DtoCrudService::new(note_repository(db), Arc::new(NoteDtoConverter::new()))
        .with_listeners(Arc::new(listeners))
        .with_validator(Arc::new(SelfValidation::new()))
}

fn dto(id: Option<i32>, title: Option<&str>, content: Option<&str>) -> NoteDto {
    NoteDto {
        id,
        title: title.map(str::to_string),
        content: content.map(str::to_string),
    }
}

#[tokio::test]
async fn test_round_trip_through_entity() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let service = dto_service(&db, ListenerContext::new());

    let created = service
        .create(dto(None, Some("shopping"), Some("milk")))
        .await
        .unwrap();

    assert_eq!(created, dto(Some(1), Some("shopping"), Some("milk")));
    assert_eq!(service.get_by_id(1).await.unwrap(), created);
}

#[tokio::test]
async fn test_identifier_checks_use_converted_entity() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let service = dto_service(&db, ListenerContext::new());

    let err = service.create(dto(Some(3), Some("x"), None)).await.unwrap_err();
    assert!(matches!(err, CrudError::Create { .. }));

    let err = service.update(dto(None, Some("x"), None)).await.unwrap_err();
    assert!(matches!(err, CrudError::Update { .. }));

    let err = service.patch(dto(None, Some("x"), None)).await.unwrap_err();
    assert!(matches!(err, CrudError::Patch { .. }));

    let err = service.delete(dto(None, Some("x"), None)).await.unwrap_err();
    assert!(matches!(err, CrudError::Delete { .. }));
}

#[tokio::test]
async fn test_patch_merges_dto_fields() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let service = dto_service(&db, ListenerContext::new());
    service
        .create(dto(None, Some("y"), Some("z")))
        .await
        .unwrap();

    let patched = service.patch(dto(Some(1), Some("x"), None)).await.unwrap();
    assert_eq!(patched, dto(Some(1), Some("x"), Some("z")));

    let err = service
        .patch(dto(Some(1), None, Some("far too long for a note body")))
        .await
        .unwrap_err();
    assert!(matches!(err, CrudError::ValidationFailed { .. }));
    assert_eq!(
        service.get_by_id(1).await.unwrap(),
        dto(Some(1), Some("x"), Some("z"))
    );
}

#[tokio::test]
async fn test_listeners_receive_dtos() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut listeners = ListenerContext::new();
    let sink = Arc::clone(&seen);
    listeners.on::<NoteDto, _>(Joinpoint::After, &CrudAction::ALL, move |note, action| {
        sink.lock().unwrap().push((action, note.id));
        Ok(())
    });
    // Entity-typed listeners never fire for a DTO service
    listeners.on::<Note, _>(Joinpoint::After, &CrudAction::ALL, |_, _| {
        Err(CrudError::internal("entity listener reached", None))
    });
    let service = dto_service(&db, listeners);

    service.create(dto(None, Some("a"), None)).await.unwrap();
    service.create(dto(None, Some("b"), None)).await.unwrap();
    let page = service.get_page(Pageable::of(0, 10)).await.unwrap();
    service.delete(page.content[0].clone()).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (CrudAction::Create, Some(1)),
            (CrudAction::Create, Some(2)),
            (CrudAction::Read, Some(1)),
            (CrudAction::Read, Some(2)),
            (CrudAction::Delete, Some(1)),
        ]
    );
}

#[tokio::test]
async fn test_conversion_failure_is_reported() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let converter = FnConverter::<NoteDto, Note>::new(
        |_| Err(CrudError::convert("Note", "NoteDto", "read side disabled")),
        |dto| {
            Ok(Note {
                id: dto.id,
                title: dto.title,
                body: dto.content,
            })
        },
    );
    let service = DtoCrudService::new(note_repository(&db), Arc::new(converter));

    let err = service.create(dto(None, Some("a"), None)).await.unwrap_err();

    assert!(matches!(err, CrudError::Convert { .. }));
    assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}
