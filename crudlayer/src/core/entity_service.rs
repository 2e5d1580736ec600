use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::traits::{CrudService, Identifiable};
use crate::errors::CrudError;
use crate::listener::ListenerContext;
use crate::pagination::{Page, Pageable};
use crate::patch::{JsonMergePatch, PatchMerge};
use crate::repository::{CrudRepository, simple_type_name};
use crate::validation::{NoValidation, ValidationProfile, Validator};

/// CRUD service operating directly on the persisted entity type.
///
/// ```ignore
/// let notes = EntityCrudService::new(Arc::new(SeaOrmRepository::<Note, note::ActiveModel>::new(db)))
///     .with_listeners(listeners.clone())
///     .with_validator(Arc::new(SelfValidation::new()));
/// let created = notes.create(Note::titled("groceries")).await?;
/// ```
pub struct EntityCrudService<T: Identifiable> {
    repository: Arc<dyn CrudRepository<T>>,
    listeners: Arc<ListenerContext>,
    patcher: Arc<dyn PatchMerge<T>>,
    validator: Arc<dyn Validator<T>>,
}

impl<T> EntityCrudService<T>
where
    T: Identifiable + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Service without listeners, merging patches through JSON and skipping validation
    #[must_use]
    pub fn new(repository: Arc<dyn CrudRepository<T>>) -> Self {
        Self {
            repository,
            listeners: Arc::new(ListenerContext::new()),
            patcher: Arc::new(JsonMergePatch::new()),
            validator: Arc::new(NoValidation),
        }
    }
}

impl<T: Identifiable> EntityCrudService<T> {
    #[must_use]
    pub fn with_listeners(mut self, listeners: Arc<ListenerContext>) -> Self {
        self.listeners = listeners;
        self
    }

    #[must_use]
    pub fn with_patcher(mut self, patcher: Arc<dyn PatchMerge<T>>) -> Self {
        self.patcher = patcher;
        self
    }

    /// Validator applied to merged patches
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn Validator<T>>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn listeners(&self) -> &ListenerContext {
        &self.listeners
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn CrudRepository<T>> {
        &self.repository
    }
}

impl<T> EntityCrudService<T>
where
    T: Identifiable + Send + Sync + 'static,
{
    async fn load(&self, id: &T::Id) -> Result<T, CrudError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CrudError::not_found(simple_type_name::<T>(), Some(id.to_string())))
    }
}

#[async_trait]
impl<T> CrudService<T, T::Id> for EntityCrudService<T>
where
    T: Identifiable + Clone + Send + Sync + 'static,
{
    async fn get_by_id(&self, id: T::Id) -> Result<T, CrudError> {
        let record = self.load(&id).await?;
        self.listeners.after_read(&record)?;
        Ok(record)
    }

    async fn get_page(&self, pageable: Pageable) -> Result<Page<T>, CrudError> {
        let page = self.repository.find_all(&pageable).await?;
        for record in &page.content {
            self.listeners.after_read(record)?;
        }
        Ok(page)
    }

    async fn create(&self, object: T) -> Result<T, CrudError> {
        if object.id().is_some() {
            return Err(CrudError::create("Id is present"));
        }
        tracing::debug!(resource = simple_type_name::<T>(), "Creating record");

        self.listeners.before_create(&object)?;
        let saved = self.repository.save(object).await?;
        self.listeners.after_create(&saved)?;
        Ok(saved)
    }

    async fn update(&self, object: T) -> Result<T, CrudError> {
        let Some(id) = object.id() else {
            return Err(CrudError::update("Id is not present"));
        };
        tracing::debug!(resource = simple_type_name::<T>(), %id, "Updating record");

        self.listeners.before_update(&object)?;
        let saved = self.repository.save(object).await?;
        self.listeners.after_update(&saved)?;
        Ok(saved)
    }

    async fn patch(&self, patch: T) -> Result<T, CrudError> {
        let Some(id) = patch.id() else {
            return Err(CrudError::patch("Id is not present"));
        };
        tracing::debug!(resource = simple_type_name::<T>(), %id, "Patching record");

        let mut target = self.load(&id).await?;
        self.patcher.merge(&patch, &mut target)?;
        self.validator.validate(&target, ValidationProfile::Update)?;

        self.listeners.before_patch(&target)?;
        let saved = self.repository.save(target).await?;
        self.listeners.after_patch(&saved)?;
        Ok(saved)
    }

    async fn delete(&self, object: T) -> Result<(), CrudError> {
        let Some(id) = object.id() else {
            return Err(CrudError::delete("Id is not present"));
        };
        tracing::debug!(resource = simple_type_name::<T>(), %id, "Deleting record");

        self.listeners.before_delete(&object)?;
        self.repository.delete(object.clone()).await?;
        self.listeners.after_delete(&object)
    }
}
