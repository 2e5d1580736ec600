use async_trait::async_trait;
use std::fmt::{Debug, Display};

use crate::errors::CrudError;
use crate::pagination::{Page, Pageable};

/// A record whose identity is an optional identifier.
///
/// `id()` is `None` until the persistence layer assigns one on the first save;
/// it never changes afterwards. Identifier presence is what separates create
/// (absent) from update, patch and delete (present).
pub trait Identifiable {
    type Id: Clone + PartialEq + Debug + Display + Send + Sync + 'static;

    fn id(&self) -> Option<Self::Id>;

    /// Assign the identifier; used by repositories that generate ids themselves
    fn set_id(&mut self, id: Self::Id);
}

/// The CRUD contract shared by the entity and DTO service variants.
///
/// Both variants emit listener notifications around every mutation and after
/// every read; see [`crate::listener`].
#[async_trait]
pub trait CrudService<T, Id>: Send + Sync
where
    T: Send + Sync + 'static,
    Id: Send + Sync + 'static,
{
    /// Load one record
    ///
    /// # Errors
    /// `CrudError::NotFound` if no record has this id.
    async fn get_by_id(&self, id: Id) -> Result<T, CrudError>;

    /// Load one page of records, ordered and sliced by the repository
    async fn get_page(&self, pageable: Pageable) -> Result<Page<T>, CrudError>;

    /// Persist a new record and return its stored form
    ///
    /// # Errors
    /// `CrudError::Create` if the input already carries an id.
    async fn create(&self, object: T) -> Result<T, CrudError>;

    /// Replace a stored record
    ///
    /// # Errors
    /// `CrudError::Update` if the input has no id.
    async fn update(&self, object: T) -> Result<T, CrudError>;

    /// Merge the present fields of `patch` onto the stored record with the same id
    ///
    /// # Errors
    /// `CrudError::Patch` if the patch has no id, `CrudError::NotFound` if nothing is
    /// stored under it, `CrudError::ValidationFailed` if the merged record is invalid.
    async fn patch(&self, patch: T) -> Result<T, CrudError>;

    /// Remove the record identified by the input's id
    ///
    /// # Errors
    /// `CrudError::Delete` if the input has no id.
    async fn delete(&self, object: T) -> Result<(), CrudError>;

    /// Load the record with this id, then delete it
    async fn delete_by_id(&self, id: Id) -> Result<(), CrudError> {
        let object = self.get_by_id(id).await?;
        self.delete(object).await
    }
}
