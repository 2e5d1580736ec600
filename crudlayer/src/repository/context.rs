use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::CrudRepository;
use crate::core::Identifiable;
use crate::errors::CrudError;
use crate::pagination::{Page, Pageable};

/// Last path segment of `std::any::type_name::<T>()`, generics stripped.
///
/// `my_app::notes::Note` becomes `Note`, `Wrapper<my_app::Note>` becomes `Wrapper`.
#[must_use]
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdType {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl IdType {
    #[must_use]
    pub fn of<I: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<I>(),
            type_name: std::any::type_name::<I>(),
        }
    }

    #[must_use]
    pub fn is<I: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<I>()
    }
}

/// What the context knows about one registered repository
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    pub entity_name: String,
    pub entity_type_id: TypeId,
    pub entity_type_name: &'static str,
    pub id_type: IdType,
}

/// Type-erased read access to a registered repository, speaking JSON.
#[async_trait]
pub trait DynRepository: Send + Sync {
    /// # Errors
    /// `CrudError::BadRequest` if `raw_id` does not parse as the id type,
    /// `CrudError::NotFound` if nothing is stored under it.
    async fn find_by_id(&self, raw_id: &str) -> Result<Value, CrudError>;

    async fn find_page(&self, pageable: Pageable) -> Result<Page<Value>, CrudError>;
}

struct JsonRepository<T: Identifiable> {
    inner: Arc<dyn CrudRepository<T>>,
    name: String,
}

fn to_json<T: Serialize>(record: &T) -> Result<Value, CrudError> {
    serde_json::to_value(record).map_err(|e| {
        CrudError::convert(simple_type_name::<T>(), "json", e.to_string())
    })
}

#[async_trait]
impl<T> DynRepository for JsonRepository<T>
where
    T: Identifiable + Serialize + Send + Sync + 'static,
    T::Id: FromStr,
{
    async fn find_by_id(&self, raw_id: &str) -> Result<Value, CrudError> {
        let id = raw_id.parse::<T::Id>().map_err(|_| {
            CrudError::bad_request(format!("Invalid id '{raw_id}' for {}", self.name))
        })?;
        let record = self
            .inner
            .find_by_id(&id)
            .await?
            .ok_or_else(|| CrudError::not_found(self.name.clone(), Some(raw_id.to_string())))?;
        to_json(&record)
    }

    async fn find_page(&self, pageable: Pageable) -> Result<Page<Value>, CrudError> {
        let page = self.inner.find_all(&pageable).await?;
        page.try_map(|record| to_json(&record))
    }
}

struct Registration {
    info: RepositoryInfo,
    // Holds an `Arc<dyn CrudRepository<T>>` for the registered `T`
    typed: Arc<dyn Any + Send + Sync>,
    dynamic: Arc<dyn DynRepository>,
}

/// Registry resolving repositories by entity type or by entity name.
///
/// Populate it once at startup, then share it behind an `Arc`.
///
/// ```ignore
/// let mut repositories = RepositoryContext::new();
/// repositories.register::<Note>(Arc::new(SeaOrmRepository::<Note, note::ActiveModel>::new(db)));
///
/// let notes = repositories.find_crud_repository::<Note>()?;
/// assert!(repositories.id_type("Note")?.is::<i32>());
/// ```
#[derive(Default)]
pub struct RepositoryContext {
    by_type: HashMap<TypeId, Registration>,
    by_name: HashMap<String, TypeId>,
}

impl RepositoryContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the simple type name of `T`
    pub fn register<T>(&mut self, repository: Arc<dyn CrudRepository<T>>) -> &mut Self
    where
        T: Identifiable + Serialize + Send + Sync + 'static,
        T::Id: FromStr,
    {
        self.register_as::<T>(simple_type_name::<T>(), repository)
    }

    /// Register under an explicit name; a later registration for the same
    /// type or name replaces the earlier one.
    pub fn register_as<T>(
        &mut self,
        name: impl Into<String>,
        repository: Arc<dyn CrudRepository<T>>,
    ) -> &mut Self
    where
        T: Identifiable + Serialize + Send + Sync + 'static,
        T::Id: FromStr,
    {
        let name = name.into();
        let type_id = TypeId::of::<T>();
        let info = RepositoryInfo {
            entity_name: name.clone(),
            entity_type_id: type_id,
            entity_type_name: std::any::type_name::<T>(),
            id_type: IdType::of::<T::Id>(),
        };
        let dynamic = Arc::new(JsonRepository {
            inner: Arc::clone(&repository),
            name: name.clone(),
        });

        if let Some(previous) = self.by_type.insert(
            type_id,
            Registration {
                info,
                typed: Arc::new(repository),
                dynamic,
            },
        ) {
            tracing::debug!(
                entity = %previous.info.entity_name,
                "Replacing repository registration"
            );
            self.by_name.remove(&previous.info.entity_name);
        }
        self.by_name.insert(name, type_id);
        self
    }

    /// # Errors
    /// `CrudError::NotFound` if no repository is registered for `T`.
    pub fn find_crud_repository<T>(&self) -> Result<Arc<dyn CrudRepository<T>>, CrudError>
    where
        T: Identifiable + Send + Sync + 'static,
    {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|registration| {
                registration
                    .typed
                    .downcast_ref::<Arc<dyn CrudRepository<T>>>()
                    .cloned()
            })
            .ok_or_else(|| Self::missing(simple_type_name::<T>()))
    }

    /// Identifier type of the repository registered under `name`
    ///
    /// # Errors
    /// `CrudError::NotFound` if nothing is registered under `name`.
    pub fn id_type(&self, name: &str) -> Result<IdType, CrudError> {
        Ok(self.repository_info(name)?.id_type)
    }

    /// # Errors
    /// `CrudError::NotFound` if nothing is registered under `name`.
    pub fn repository_info(&self, name: &str) -> Result<&RepositoryInfo, CrudError> {
        Ok(&self.registration(name)?.info)
    }

    /// # Errors
    /// `CrudError::NotFound` if nothing is registered under `name`.
    pub fn dynamic(&self, name: &str) -> Result<Arc<dyn DynRepository>, CrudError> {
        Ok(Arc::clone(&self.registration(name)?.dynamic))
    }

    /// Registered entity names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    fn registration(&self, name: &str) -> Result<&Registration, CrudError> {
        self.by_name
            .get(name)
            .and_then(|type_id| self.by_type.get(type_id))
            .ok_or_else(|| Self::missing(name))
    }

    fn missing(name: &str) -> CrudError {
        CrudError::not_found("Repository", Some(name.to_string()))
    }
}
