//! Lifecycle notifications around CRUD operations.
//!
//! Every write operation notifies listeners at [`Joinpoint::Before`] and
//! [`Joinpoint::After`]; reads notify once, after the record was loaded.
//! Listeners are registered on a [`ListenerContext`] either as closures or
//! through one of the capability traits below, each of which collapses into a
//! registration keyed by (entity type, actions, joinpoint).
//!
//! A listener returning an error aborts the operation: later listeners are
//! skipped and the error reaches the caller unchanged. Nothing is rolled back
//! when an `After` listener fails.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CrudError;

pub mod context;

pub use context::ListenerContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    Create,
    Read,
    Update,
    Patch,
    Delete,
}

impl CrudAction {
    pub const WRITES: [CrudAction; 4] = [Self::Create, Self::Update, Self::Patch, Self::Delete];
    pub const ALL: [CrudAction; 5] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Patch,
        Self::Delete,
    ];
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joinpoint {
    Before,
    After,
}

impl fmt::Display for Joinpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
        })
    }
}

/// Called after a record of type `T` was read
pub trait ReadListener<T>: Send + Sync {
    /// # Errors
    /// Any error aborts the read.
    fn on_read(&self, object: &T) -> Result<(), CrudError>;
}

pub trait CreateListener<T>: Send + Sync {
    /// # Errors
    /// Any error aborts the create.
    fn on_create(&self, object: &T) -> Result<(), CrudError>;

    fn joinpoint(&self) -> Joinpoint {
        Joinpoint::Before
    }
}

/// Observes both full updates and patches
pub trait UpdateListener<T>: Send + Sync {
    /// # Errors
    /// Any error aborts the update.
    fn on_update(&self, object: &T) -> Result<(), CrudError>;

    /// Defaults to [`UpdateListener::on_update`]
    ///
    /// # Errors
    /// Any error aborts the patch.
    fn on_patch(&self, object: &T) -> Result<(), CrudError> {
        self.on_update(object)
    }

    fn joinpoint(&self) -> Joinpoint {
        Joinpoint::Before
    }
}

pub trait DeleteListener<T>: Send + Sync {
    /// # Errors
    /// Any error aborts the delete.
    fn on_delete(&self, object: &T) -> Result<(), CrudError>;

    fn joinpoint(&self) -> Joinpoint {
        Joinpoint::Before
    }
}

/// Observes create, update, patch and delete with a single callback
pub trait WriteListener<T>: Send + Sync {
    /// # Errors
    /// Any error aborts the write.
    fn on_write(&self, object: &T, action: CrudAction) -> Result<(), CrudError>;

    fn joinpoint(&self) -> Joinpoint {
        Joinpoint::Before
    }
}

/// Observes every action: reads after loading, writes at [`CrudListener::joinpoint`]
pub trait CrudListener<T>: Send + Sync {
    /// # Errors
    /// Any error aborts the operation.
    fn on_action(&self, object: &T, action: CrudAction) -> Result<(), CrudError>;

    fn joinpoint(&self) -> Joinpoint {
        Joinpoint::Before
    }
}
