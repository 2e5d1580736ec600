use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{CrudRepository, simple_type_name};
use crate::core::Identifiable;
use crate::errors::CrudError;
use crate::pagination::{Page, Pageable, Sort};

type IdGenerator<Id> = Box<dyn Fn() -> Result<Id, CrudError> + Send + Sync>;

/// Repository keeping records in insertion order in memory.
///
/// Sorting compares the JSON form of the named property, so any `Serialize`
/// record can be paged and sorted without a schema.
pub struct InMemoryRepository<T: Identifiable> {
    records: RwLock<Vec<T>>,
    next_id: IdGenerator<T::Id>,
}

impl<T: Identifiable> InMemoryRepository<T> {
    pub fn with_id_generator(
        generator: impl Fn() -> Result<T::Id, CrudError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: Box::new(generator),
        }
    }

    /// Number of stored records
    ///
    /// # Errors
    /// Fails only if the lock was poisoned.
    pub fn len(&self) -> Result<usize, CrudError> {
        Ok(self.read()?.len())
    }

    /// # Errors
    /// Fails only if the lock was poisoned.
    pub fn is_empty(&self) -> Result<bool, CrudError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, CrudError> {
        self.records
            .read()
            .map_err(|_| CrudError::internal("Repository lock poisoned", None))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, CrudError> {
        self.records
            .write()
            .map_err(|_| CrudError::internal("Repository lock poisoned", None))
    }

    fn not_found(id: &T::Id) -> CrudError {
        CrudError::not_found(simple_type_name::<T>(), Some(id.to_string()))
    }
}

impl<T> InMemoryRepository<T>
where
    T: Identifiable,
    T::Id: TryFrom<u64>,
{
    /// Ids 1, 2, 3, ... converted into the record's id type
    #[must_use]
    pub fn sequential() -> Self {
        let counter = AtomicU64::new(0);
        Self::with_id_generator(move || {
            let next = counter.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            <T::Id as TryFrom<u64>>::try_from(next)
                .map_err(|_| CrudError::internal("Id sequence exhausted", Some(next.to_string())))
        })
    }
}

impl<T> InMemoryRepository<T>
where
    T: Identifiable<Id = Uuid>,
{
    /// Random v4 UUIDs
    #[must_use]
    pub fn uuid() -> Self {
        Self::with_id_generator(|| Ok(Uuid::new_v4()))
    }
}

/// Order JSON values: null < bool < number < string; other kinds compare equal
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_by_sort(a: &Value, b: &Value, sort: &Sort) -> Ordering {
    for order in sort.iter() {
        let left = a.get(&order.property).unwrap_or(&Value::Null);
        let right = b.get(&order.property).unwrap_or(&Value::Null);
        let ordering = compare_values(left, right);
        let ordering = if order.direction.is_ascending() {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl<T> CrudRepository<T> for InMemoryRepository<T>
where
    T: Identifiable + Serialize + Clone + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, CrudError> {
        Ok(self
            .read()?
            .iter()
            .find(|record| record.id().as_ref() == Some(id))
            .cloned())
    }

    async fn find_all(&self, pageable: &Pageable) -> Result<Page<T>, CrudError> {
        let records = self.read()?.clone();
        let total = records.len() as u64;

        let mut keyed = records
            .into_iter()
            .map(|record| {
                let key = serde_json::to_value(&record).map_err(|e| {
                    CrudError::internal("Failed to read sort keys", Some(e.to_string()))
                })?;
                Ok((key, record))
            })
            .collect::<Result<Vec<(Value, T)>, CrudError>>()?;
        if pageable.sort.is_sorted() {
            keyed.sort_by(|(a, _), (b, _)| compare_by_sort(a, b, &pageable.sort));
        }

        let offset = usize::try_from(pageable.offset()).unwrap_or(usize::MAX);
        let limit = pageable
            .size
            .map_or(usize::MAX, |size| usize::try_from(size).unwrap_or(usize::MAX));
        let content = keyed
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, record)| record)
            .collect();

        Ok(Page::new(content, pageable, total))
    }

    async fn save(&self, mut record: T) -> Result<T, CrudError> {
        let mut records = self.write()?;
        match record.id() {
            None => {
                record.set_id((self.next_id)()?);
                records.push(record.clone());
                Ok(record)
            }
            Some(id) => {
                let slot = records
                    .iter_mut()
                    .find(|stored| stored.id().as_ref() == Some(&id))
                    .ok_or_else(|| Self::not_found(&id))?;
                *slot = record.clone();
                Ok(record)
            }
        }
    }

    async fn delete(&self, record: T) -> Result<(), CrudError> {
        let id = record
            .id()
            .ok_or_else(|| CrudError::delete("Id is not present"))?;
        let mut records = self.write()?;
        let position = records
            .iter()
            .position(|stored| stored.id().as_ref() == Some(&id))
            .ok_or_else(|| Self::not_found(&id))?;
        records.remove(position);
        Ok(())
    }
}
