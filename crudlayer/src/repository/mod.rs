//! Data access seam of the crate.
//!
//! [`CrudRepository`] is a thin pass-through to the persistence provider: the
//! services decide *what* to do (identifier checks, merges, listener dispatch),
//! the repository only finds, pages, saves and deletes.
//!
//! - [`SeaOrmRepository`]: backed by a Sea-ORM `DatabaseConnection`
//! - [`InMemoryRepository`]: a `Vec` behind a lock, for tests and prototypes
//! - [`RepositoryContext`]: registry resolving repositories by type or type name

use async_trait::async_trait;

use crate::core::Identifiable;
use crate::errors::CrudError;
use crate::pagination::{Page, Pageable};

pub mod context;
pub mod database;
pub mod memory;

pub use context::{DynRepository, IdType, RepositoryContext, RepositoryInfo, simple_type_name};
pub use database::SeaOrmRepository;
pub use memory::InMemoryRepository;

#[async_trait]
pub trait CrudRepository<T>: Send + Sync
where
    T: Identifiable + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, CrudError>;

    /// Page through all records; ordering and slicing follow `pageable`
    async fn find_all(&self, pageable: &Pageable) -> Result<Page<T>, CrudError>;

    /// Insert the record when it has no id, replace the stored one otherwise
    ///
    /// Returns the stored form, with the generated id on insert.
    async fn save(&self, record: T) -> Result<T, CrudError>;

    /// # Errors
    /// `CrudError::NotFound` if nothing is stored under the record's id.
    async fn delete(&self, record: T) -> Result<(), CrudError>;
}
