use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::errors::CrudError;
use crate::repository::simple_type_name;

/// Merges the present fields of a partial object onto a loaded target
pub trait PatchMerge<T>: Send + Sync {
    /// # Errors
    /// `CrudError::Internal` when the merge cannot be performed.
    fn merge(&self, patch: &T, target: &mut T) -> Result<(), CrudError>;
}

/// Merge through the JSON form of `T`.
///
/// Non-null patch fields overwrite the target; nested objects merge field by
/// field; `null` (an absent `Option`) leaves the target untouched, so a patch
/// can never clear a field.
pub struct JsonMergePatch<T>(PhantomData<fn(&T)>);

impl<T> JsonMergePatch<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonMergePatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_objects(patch: Map<String, Value>, target: &mut Map<String, Value>) {
    for (name, value) in patch {
        match value {
            Value::Null => {}
            Value::Object(nested) => match target.get_mut(&name) {
                Some(Value::Object(existing)) => merge_objects(nested, existing),
                _ => {
                    target.insert(name, Value::Object(nested));
                }
            },
            value => {
                target.insert(name, value);
            }
        }
    }
}

impl<T> PatchMerge<T> for JsonMergePatch<T>
where
    T: Serialize + DeserializeOwned,
{
    fn merge(&self, patch: &T, target: &mut T) -> Result<(), CrudError> {
        let fail = |e: serde_json::Error| {
            CrudError::internal(
                format!("Failed to merge patch into {}", simple_type_name::<T>()),
                Some(e.to_string()),
            )
        };

        let patch = serde_json::to_value(patch).map_err(fail)?;
        let mut merged = serde_json::to_value(&*target).map_err(fail)?;
        match (patch, &mut merged) {
            (Value::Object(fields), Value::Object(existing)) => merge_objects(fields, existing),
            (Value::Null, _) => {}
            (value, slot) => *slot = value,
        }
        *target = serde_json::from_value(merged).map_err(fail)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Address {
        city: Option<String>,
        zip: Option<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Contact {
        id: Option<i32>,
        my_field: Option<String>,
        other: Option<String>,
        address: Option<Address>,
    }

    #[test]
    fn test_present_fields_win() {
        let patch = Contact {
            id: Some(2),
            my_field: Some("x".to_string()),
            ..Contact::default()
        };
        let mut target = Contact {
            id: Some(2),
            my_field: Some("y".to_string()),
            other: Some("z".to_string()),
            address: None,
        };

        JsonMergePatch::new().merge(&patch, &mut target).unwrap();

        assert_eq!(
            target,
            Contact {
                id: Some(2),
                my_field: Some("x".to_string()),
                other: Some("z".to_string()),
                address: None,
            }
        );
    }

    #[test]
    fn test_nested_objects_merge() {
        let patch = Contact {
            address: Some(Address {
                city: Some("Lyon".to_string()),
                zip: None,
            }),
            ..Contact::default()
        };
        let mut target = Contact {
            address: Some(Address {
                city: Some("Paris".to_string()),
                zip: Some("75001".to_string()),
            }),
            ..Contact::default()
        };

        JsonMergePatch::new().merge(&patch, &mut target).unwrap();

        let address = target.address.unwrap();
        assert_eq!(address.city.as_deref(), Some("Lyon"));
        assert_eq!(address.zip.as_deref(), Some("75001"));
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut target = Contact {
            id: Some(9),
            other: Some("kept".to_string()),
            ..Contact::default()
        };
        let before = target.clone();
        JsonMergePatch::new()
            .merge(&Contact::default(), &mut target)
            .unwrap();
        assert_eq!(target, before);
    }
}
