//! Axum routers exposing CRUD services over HTTP.
//!
//! [`CrudController::router`] maps the verbs of one resource onto a
//! [`CrudService`]:
//!
//! | Verb     | Path    | Operation      | Success               |
//! |----------|---------|----------------|-----------------------|
//! | `GET`    | `/{id}` | `get_by_id`    | 200                   |
//! | `GET`    | `/`     | `get_page`     | 200 + `Content-Range` |
//! | `POST`   | `/`     | `create`       | 201                   |
//! | `PUT`    | `/`     | `update`       | 200                   |
//! | `PATCH`  | `/`     | `patch`        | 200                   |
//! | `DELETE` | `/`     | `delete`       | 204                   |
//! | `DELETE` | `/{id}` | `delete_by_id` | 204                   |
//!
//! Request bodies are validated with the profile of their verb before they
//! reach the service. [`repository_router`] serves read-only JSON for every
//! repository of a [`RepositoryContext`], addressed by entity name.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header::HeaderMap},
    routing::get,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::CrudConfig;
use crate::core::CrudService;
use crate::errors::CrudError;
use crate::models::PageQuery;
use crate::pagination::{Page, Pageable, calculate_content_range};
use crate::repository::{RepositoryContext, simple_type_name};
use crate::validation::{NoValidation, ValidationProfile, Validator};

/// HTTP front of one [`CrudService`].
///
/// ```ignore
/// let notes = CrudController::new(Arc::new(note_service))
///     .with_validator(Arc::new(SelfValidation::new()))
///     .with_resource_name("notes");
/// let app = Router::new().nest("/api/notes", notes.router());
/// ```
pub struct CrudController<T, Id> {
    service: Arc<dyn CrudService<T, Id>>,
    validator: Arc<dyn Validator<T>>,
    config: CrudConfig,
    resource_name: String,
}

impl<T, Id> CrudController<T, Id>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(service: Arc<dyn CrudService<T, Id>>) -> Self {
        Self {
            service,
            validator: Arc::new(NoValidation),
            config: CrudConfig::default(),
            resource_name: simple_type_name::<T>().to_lowercase(),
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn Validator<T>>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.config = config;
        self
    }

    /// Name used in the `Content-Range` header; defaults to the lowercased type name
    #[must_use]
    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = name.into();
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route(
                "/",
                get(get_page::<T, Id>)
                    .post(create::<T, Id>)
                    .put(update::<T, Id>)
                    .patch(patch::<T, Id>)
                    .delete(delete::<T, Id>),
            )
            .route("/{id}", get(get_one::<T, Id>).delete(delete_one::<T, Id>))
            .with_state(Arc::new(self))
    }

    fn parse_id(raw: &str) -> Result<Id, CrudError> {
        raw.parse::<Id>()
            .map_err(|_| CrudError::bad_request(format!("Invalid id '{raw}'")))
    }

    fn body(
        &self,
        payload: Result<Json<T>, JsonRejection>,
        profile: ValidationProfile,
    ) -> Result<T, CrudError> {
        let Json(object) = payload.map_err(|rejection| {
            CrudError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
        })?;
        self.validator.validate(&object, profile)?;
        Ok(object)
    }
}

type Controller<T, Id> = State<Arc<CrudController<T, Id>>>;

fn page_request(
    query: Result<Query<PageQuery>, QueryRejection>,
    config: &CrudConfig,
) -> Result<Pageable, CrudError> {
    let Query(query) = query.map_err(|rejection| {
        CrudError::bad_request(format!("Invalid query: {}", rejection.body_text()))
    })?;
    query.into_pageable(config)
}

async fn get_one<T, Id>(
    State(controller): Controller<T, Id>,
    Path(raw_id): Path<String>,
) -> Result<Json<T>, CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let id = CrudController::<T, Id>::parse_id(&raw_id)?;
    Ok(Json(controller.service.get_by_id(id).await?))
}

async fn get_page<T, Id>(
    State(controller): Controller<T, Id>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<(HeaderMap, Json<Page<T>>), CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let pageable = page_request(query, &controller.config)?;
    let page = controller.service.get_page(pageable).await?;
    let headers = calculate_content_range(
        page.offset(),
        page.size,
        page.total_elements,
        &controller.resource_name,
    );
    Ok((headers, Json(page)))
}

async fn create<T, Id>(
    State(controller): Controller<T, Id>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let object = controller.body(payload, ValidationProfile::Create)?;
    let created = controller.service.create(object).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update<T, Id>(
    State(controller): Controller<T, Id>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<Json<T>, CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let object = controller.body(payload, ValidationProfile::Update)?;
    Ok(Json(controller.service.update(object).await?))
}

async fn patch<T, Id>(
    State(controller): Controller<T, Id>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<Json<T>, CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let object = controller.body(payload, ValidationProfile::Patch)?;
    Ok(Json(controller.service.patch(object).await?))
}

async fn delete<T, Id>(
    State(controller): Controller<T, Id>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<StatusCode, CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let object = controller.body(payload, ValidationProfile::Delete)?;
    controller.service.delete(object).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_one<T, Id>(
    State(controller): Controller<T, Id>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, CrudError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    Id: FromStr + Send + Sync + 'static,
{
    let id = CrudController::<T, Id>::parse_id(&raw_id)?;
    controller.service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Clone)]
struct RepositoryState {
    repositories: Arc<RepositoryContext>,
    config: CrudConfig,
}

/// Read-only routes over every registered repository:
/// `GET /{entity}` pages and `GET /{entity}/{id}` loads one record.
pub fn repository_router(repositories: Arc<RepositoryContext>, config: CrudConfig) -> Router {
    Router::new()
        .route("/{entity}", get(find_page))
        .route("/{entity}/{id}", get(find_one))
        .with_state(RepositoryState {
            repositories,
            config,
        })
}

async fn find_one(
    State(state): State<RepositoryState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<Value>, CrudError> {
    let repository = state.repositories.dynamic(&entity)?;
    Ok(Json(repository.find_by_id(&id).await?))
}

async fn find_page(
    State(state): State<RepositoryState>,
    Path(entity): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<(HeaderMap, Json<Page<Value>>), CrudError> {
    let repository = state.repositories.dynamic(&entity)?;
    let pageable = page_request(query, &state.config)?;
    let page = repository.find_page(pageable).await?;
    let headers = calculate_content_range(page.offset(), page.size, page.total_elements, &entity);
    Ok((headers, Json(page)))
}
