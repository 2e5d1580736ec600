//! # Notes API
//!
//! A running server wiring every layer together:
//!
//! - a Sea-ORM repository over an in-memory SQLite table
//! - an entity service with an audit listener and self-validation
//! - the generic CRUD controller under `/notes`
//! - the read-only repository router under `/repositories`
//!
//! Run with: `cargo run --example notes_api`, then for instance
//!
//! ```bash
//! curl -X POST localhost:3000/notes -H 'content-type: application/json' -d '{"title":"groceries"}'
//! curl -X PATCH localhost:3000/notes -H 'content-type: application/json' -d '{"id":1,"body":"milk"}'
//! curl 'localhost:3000/notes?sort=title,asc'
//! curl localhost:3000/repositories/notes/1
//! ```

use axum::Router;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crudlayer::validation::validators::{validate_length, validate_required};
use crudlayer::{
    CrudAction, CrudConfig, CrudController, CrudError, EntityCrudService, Identifiable,
    ListenerContext, RepositoryContext, SeaOrmRepository, SelfValidation, Validatable,
    ValidationErrors, ValidationProfile, WriteListener, repository_router,
};

mod note {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "notes")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub body: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
struct Note {
    id: Option<i32>,
    title: Option<String>,
    body: Option<String>,
}

impl From<note::Model> for Note {
    fn from(model: note::Model) -> Self {
        Self {
            id: Some(model.id),
            title: Some(model.title),
            body: model.body,
        }
    }
}

impl sea_orm::IntoActiveModel<note::ActiveModel> for Note {
    fn into_active_model(self) -> note::ActiveModel {
        use sea_orm::ActiveValue::{NotSet, Set};

        note::ActiveModel {
            id: self.id.map_or(NotSet, Set),
            title: self.title.map_or(NotSet, Set),
            body: Set(self.body),
        }
    }
}

impl Identifiable for Note {
    type Id = i32;

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = Some(id);
    }
}

impl Validatable for Note {
    fn validate(&self, profile: ValidationProfile) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if matches!(profile, ValidationProfile::Create | ValidationProfile::Update) {
            errors.check(validate_required("title", self.title.as_deref()));
        }
        if let Some(title) = &self.title {
            errors.check(validate_length("title", title, Some(1), Some(200)));
        }
        errors.result()
    }
}

struct AuditLog;

impl WriteListener<Note> for AuditLog {
    fn on_write(&self, object: &Note, action: CrudAction) -> Result<(), CrudError> {
        tracing::info!(%action, id = ?object.id, title = ?object.title, "note written");
        Ok(())
    }

    fn joinpoint(&self) -> crudlayer::Joinpoint {
        crudlayer::Joinpoint::After
    }
}

type NoteRepository = SeaOrmRepository<Note, note::ActiveModel>;

async fn setup_database() -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    // A single connection keeps the in-memory database alive
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;

    let schema = Schema::new(db.get_database_backend());
    let statement = schema.create_table_from_entity(note::Entity);
    db.execute(db.get_database_backend().build(&statement)).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,crudlayer=debug")),
        )
        .init();

    let db = setup_database().await?;
    let repository = Arc::new(NoteRepository::new(db));

    let mut listeners = ListenerContext::new();
    listeners.add_write_listener::<Note, _>(Arc::new(AuditLog));

    let service = EntityCrudService::new(repository.clone())
        .with_listeners(Arc::new(listeners))
        .with_validator(Arc::new(SelfValidation::new()));
    let config = CrudConfig::default().with_max_page_size(500);
    let notes = CrudController::<Note, i32>::new(Arc::new(service))
        .with_validator(Arc::new(SelfValidation::new()))
        .with_config(config.clone())
        .with_resource_name("notes");

    let mut repositories = RepositoryContext::new();
    repositories.register_as::<Note>("notes", repository);

    let app = Router::new()
        .nest("/notes", notes.router())
        .nest("/repositories", repository_router(Arc::new(repositories), config));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Notes API listening on http://localhost:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
