// CRUD contract and its two service variants

pub mod dto_service;
pub mod entity_service;
pub mod traits;

pub use dto_service::DtoCrudService;
pub use entity_service::EntityCrudService;
pub use traits::{CrudService, Identifiable};
