//! DTO <-> entity mapping used by [`crate::core::DtoCrudService`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

use crate::errors::CrudError;
use crate::repository::simple_type_name;

/// Bidirectional mapping between a DTO `D` and its entity `E`
pub trait DtoConverter<D, E>: Send + Sync {
    /// # Errors
    /// `CrudError::Convert` when the entity cannot be represented as a DTO.
    fn to_dto(&self, entity: E) -> Result<D, CrudError>;

    /// # Errors
    /// `CrudError::Convert` when the DTO cannot be represented as an entity.
    fn to_entity(&self, dto: D) -> Result<E, CrudError>;
}

type ConvertFn<S, T> = Box<dyn Fn(S) -> Result<T, CrudError> + Send + Sync>;

/// Converter made of two closures supplied by the application
pub struct FnConverter<D, E> {
    to_dto: ConvertFn<E, D>,
    to_entity: ConvertFn<D, E>,
}

impl<D, E> FnConverter<D, E> {
    pub fn new(
        to_dto: impl Fn(E) -> Result<D, CrudError> + Send + Sync + 'static,
        to_entity: impl Fn(D) -> Result<E, CrudError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            to_dto: Box::new(to_dto),
            to_entity: Box::new(to_entity),
        }
    }
}

impl<D, E> DtoConverter<D, E> for FnConverter<D, E> {
    fn to_dto(&self, entity: E) -> Result<D, CrudError> {
        (self.to_dto)(entity)
    }

    fn to_entity(&self, dto: D) -> Result<E, CrudError> {
        (self.to_entity)(dto)
    }
}

/// Converter relying on `From` impls in both directions; never fails
pub struct FromConverter<D, E>(PhantomData<fn() -> (D, E)>);

impl<D, E> FromConverter<D, E> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<D, E> Default for FromConverter<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, E> DtoConverter<D, E> for FromConverter<D, E>
where
    D: From<E>,
    E: From<D>,
{
    fn to_dto(&self, entity: E) -> Result<D, CrudError> {
        Ok(D::from(entity))
    }

    fn to_entity(&self, dto: D) -> Result<E, CrudError> {
        Ok(E::from(dto))
    }
}

/// Copies identically named fields between two serde types.
///
/// The target starts as `Target::default()`; every field of the source that
/// also exists on the target overwrites it. Fields only the source has are
/// dropped, fields only the target has keep their default.
pub struct FieldCopyConverter<D, E>(PhantomData<fn() -> (D, E)>);

impl<D, E> FieldCopyConverter<D, E> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<D, E> Default for FieldCopyConverter<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy the fields of `source` shared with `Target` onto a default `Target`
///
/// # Errors
/// `CrudError::Convert` if either side does not serialize to a JSON object or
/// a copied field does not fit the target field's type.
pub fn copy_fields<Source, Target>(source: &Source) -> Result<Target, CrudError>
where
    Source: Serialize,
    Target: Serialize + DeserializeOwned + Default,
{
    let from = simple_type_name::<Source>();
    let to = simple_type_name::<Target>();
    let fail = |details: String| CrudError::convert(from, to, details);

    let Value::Object(fields) = serde_json::to_value(source).map_err(|e| fail(e.to_string()))?
    else {
        return Err(fail("source is not a struct".to_string()));
    };
    let Value::Object(mut target) =
        serde_json::to_value(Target::default()).map_err(|e| fail(e.to_string()))?
    else {
        return Err(fail("target is not a struct".to_string()));
    };

    for (name, value) in fields {
        if let Some(slot) = target.get_mut(&name) {
            *slot = value;
        }
    }

    serde_json::from_value(Value::Object(target)).map_err(|e| fail(e.to_string()))
}

impl<D, E> DtoConverter<D, E> for FieldCopyConverter<D, E>
where
    D: Serialize + DeserializeOwned + Default,
    E: Serialize + DeserializeOwned + Default,
{
    fn to_dto(&self, entity: E) -> Result<D, CrudError> {
        copy_fields(&entity)
    }

    fn to_entity(&self, dto: D) -> Result<E, CrudError> {
        copy_fields(&dto)
    }
}
