#![allow(dead_code)]

use axum::Router;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use std::sync::{Arc, Mutex};

use crudlayer::{
    CrudAction, CrudController, CrudError, EntityCrudService, ListenerContext, SelfValidation,
    SeaOrmRepository, WriteListener,
};

pub mod note_entity;

use note_entity::{Note, NoteRepository};

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn note_repository(db: &DatabaseConnection) -> Arc<NoteRepository> {
    Arc::new(SeaOrmRepository::new(db.clone()))
}

pub fn note_service(
    db: &DatabaseConnection,
    listeners: ListenerContext,
) -> EntityCrudService<Note> {
    EntityCrudService::new(note_repository(db))
        .with_listeners(Arc::new(listeners))
        .with_validator(Arc::new(SelfValidation::new()))
}

pub fn setup_notes_app(db: &DatabaseConnection) -> Router {
    let service = note_service(db, ListenerContext::new());
    let controller = CrudController::<Note, i32>::new(Arc::new(service))
        .with_validator(Arc::new(SelfValidation::new()))
        .with_resource_name("notes");

    Router::new().nest("/api/v1/notes", controller.router())
}

/// Remembers every write it observes
#[derive(Default)]
pub struct RecordingListener {
    pub actions: Mutex<Vec<(CrudAction, Option<i32>)>>,
}

impl RecordingListener {
    pub fn last_action(&self) -> Option<CrudAction> {
        self.actions.lock().unwrap().last().map(|(action, _)| *action)
    }
}

impl WriteListener<Note> for RecordingListener {
    fn on_write(&self, object: &Note, action: CrudAction) -> Result<(), CrudError> {
        self.actions.lock().unwrap().push((action, object.id));
        Ok(())
    }
}

pub async fn seed_notes(db: &DatabaseConnection, titles: &[&str]) -> Vec<Note> {
    use crudlayer::CrudService;

    let service = note_service(db, ListenerContext::new());
    let mut created = Vec::new();
    for title in titles {
        created.push(service.create(Note::titled(title)).await.unwrap());
    }
    created
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateNoteTable)]
    }
}

pub struct CreateNoteTable;

#[async_trait::async_trait]
impl MigrationName for CreateNoteTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_note_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateNoteTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(NoteTable)
            .if_not_exists()
            .col(
                ColumnDef::new(NoteColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(NoteColumn::Title)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(NoteColumn::Body).text().null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoteTable).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum NoteColumn {
    Id,
    Title,
    Body,
}

impl Iden for NoteColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Title => "title",
                Self::Body => "body",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct NoteTable;

impl Iden for NoteTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "notes").unwrap();
    }
}
