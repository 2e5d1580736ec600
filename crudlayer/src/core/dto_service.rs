use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::traits::{CrudService, Identifiable};
use crate::convert::DtoConverter;
use crate::errors::CrudError;
use crate::listener::ListenerContext;
use crate::pagination::{Page, Pageable};
use crate::patch::{JsonMergePatch, PatchMerge};
use crate::repository::{CrudRepository, simple_type_name};
use crate::validation::{NoValidation, ValidationProfile, Validator};

/// CRUD service exposing DTOs `D` while persisting entities `E`.
///
/// Identifiers are read from the converted entity. Listeners, patch merging
/// and validation all operate on the DTO.
pub struct DtoCrudService<D, E: Identifiable> {
    repository: Arc<dyn CrudRepository<E>>,
    converter: Arc<dyn DtoConverter<D, E>>,
    listeners: Arc<ListenerContext>,
    patcher: Arc<dyn PatchMerge<D>>,
    validator: Arc<dyn Validator<D>>,
}

impl<D, E> DtoCrudService<D, E>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
    E: Identifiable + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(
        repository: Arc<dyn CrudRepository<E>>,
        converter: Arc<dyn DtoConverter<D, E>>,
    ) -> Self {
        Self {
            repository,
            converter,
            listeners: Arc::new(ListenerContext::new()),
            patcher: Arc::new(JsonMergePatch::new()),
            validator: Arc::new(NoValidation),
        }
    }
}

impl<D, E: Identifiable> DtoCrudService<D, E> {
    #[must_use]
    pub fn with_listeners(mut self, listeners: Arc<ListenerContext>) -> Self {
        self.listeners = listeners;
        self
    }

    #[must_use]
    pub fn with_patcher(mut self, patcher: Arc<dyn PatchMerge<D>>) -> Self {
        self.patcher = patcher;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn Validator<D>>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn listeners(&self) -> &ListenerContext {
        &self.listeners
    }
}

impl<D, E> DtoCrudService<D, E>
where
    D: Send + Sync + 'static,
    E: Identifiable + Send + Sync + 'static,
{
    async fn load(&self, id: &E::Id) -> Result<E, CrudError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CrudError::not_found(simple_type_name::<E>(), Some(id.to_string())))
    }

    async fn save(&self, entity: E) -> Result<D, CrudError> {
        let saved = self.repository.save(entity).await?;
        self.converter.to_dto(saved)
    }
}

#[async_trait]
impl<D, E> CrudService<D, E::Id> for DtoCrudService<D, E>
where
    D: Clone + Send + Sync + 'static,
    E: Identifiable + Send + Sync + 'static,
{
    async fn get_by_id(&self, id: E::Id) -> Result<D, CrudError> {
        let dto = self.converter.to_dto(self.load(&id).await?)?;
        self.listeners.after_read(&dto)?;
        Ok(dto)
    }

    async fn get_page(&self, pageable: Pageable) -> Result<Page<D>, CrudError> {
        let page = self
            .repository
            .find_all(&pageable)
            .await?
            .try_map(|entity| self.converter.to_dto(entity))?;
        for dto in &page.content {
            self.listeners.after_read(dto)?;
        }
        Ok(page)
    }

    async fn create(&self, dto: D) -> Result<D, CrudError> {
        let entity = self.converter.to_entity(dto.clone())?;
        if entity.id().is_some() {
            return Err(CrudError::create("Id is present"));
        }
        tracing::debug!(resource = simple_type_name::<E>(), "Creating record");

        self.listeners.before_create(&dto)?;
        let saved = self.save(entity).await?;
        self.listeners.after_create(&saved)?;
        Ok(saved)
    }

    async fn update(&self, dto: D) -> Result<D, CrudError> {
        let entity = self.converter.to_entity(dto.clone())?;
        let Some(id) = entity.id() else {
            return Err(CrudError::update("Id is not present"));
        };
        tracing::debug!(resource = simple_type_name::<E>(), %id, "Updating record");

        self.listeners.before_update(&dto)?;
        let saved = self.save(entity).await?;
        self.listeners.after_update(&saved)?;
        Ok(saved)
    }

    async fn patch(&self, patch: D) -> Result<D, CrudError> {
        let Some(id) = self.converter.to_entity(patch.clone())?.id() else {
            return Err(CrudError::patch("Id is not present"));
        };
        tracing::debug!(resource = simple_type_name::<E>(), %id, "Patching record");

        let mut target = self.converter.to_dto(self.load(&id).await?)?;
        self.patcher.merge(&patch, &mut target)?;
        self.validator.validate(&target, ValidationProfile::Update)?;

        self.listeners.before_patch(&target)?;
        let saved = self.save(self.converter.to_entity(target)?).await?;
        self.listeners.after_patch(&saved)?;
        Ok(saved)
    }

    async fn delete(&self, dto: D) -> Result<(), CrudError> {
        let entity = self.converter.to_entity(dto.clone())?;
        let Some(id) = entity.id() else {
            return Err(CrudError::delete("Id is not present"));
        };
        tracing::debug!(resource = simple_type_name::<E>(), %id, "Deleting record");

        self.listeners.before_delete(&dto)?;
        self.repository.delete(entity).await?;
        self.listeners.after_delete(&dto)
    }
}
