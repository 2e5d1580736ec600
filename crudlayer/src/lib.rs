//! Generic CRUD services with lifecycle listeners, DTO conversion and patch
//! merging, exposed over axum and persisted through Sea-ORM.

pub mod config;
pub mod convert;
pub mod core;
pub mod errors;
pub mod listener;
pub mod models;
pub mod pagination;
pub mod patch;
pub mod repository;
pub mod routes;
pub mod validation;

pub use config::CrudConfig;
pub use convert::{DtoConverter, FieldCopyConverter, FnConverter, FromConverter};
pub use crate::core::{CrudService, DtoCrudService, EntityCrudService, Identifiable};
pub use errors::CrudError;
pub use listener::{
    CreateListener, CrudAction, CrudListener, DeleteListener, Joinpoint, ListenerContext,
    ReadListener, UpdateListener, WriteListener,
};
pub use pagination::{Direction, Page, Pageable, Sort, SortOrder};
pub use patch::{JsonMergePatch, PatchMerge};
pub use repository::{CrudRepository, InMemoryRepository, RepositoryContext, SeaOrmRepository};
pub use routes::{CrudController, repository_router};
pub use validation::{
    NoValidation, SelfValidation, Validatable, ValidationError, ValidationErrors,
    ValidationProfile, Validator,
};

pub use serde_with;
