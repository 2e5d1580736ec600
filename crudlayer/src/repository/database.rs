use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    Iterable, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryOrder,
};
use std::marker::PhantomData;
use std::str::FromStr;

use super::{CrudRepository, simple_type_name};
use crate::core::Identifiable;
use crate::errors::CrudError;
use crate::pagination::{Page, Pageable};

/// Repository backed by a Sea-ORM connection.
///
/// `T` is the application record (with an optional id) and `A` the active
/// model of the table it is stored in. `T` converts into `A` with the primary
/// key left `NotSet` when it has no id, and is rebuilt from the stored model.
pub struct SeaOrmRepository<T, A> {
    db: DatabaseConnection,
    _marker: PhantomData<fn() -> (T, A)>,
}

impl<T, A> SeaOrmRepository<T, A> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl<T, A> Clone for SeaOrmRepository<T, A> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

#[async_trait]
impl<T, A> CrudRepository<T> for SeaOrmRepository<T, A>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    A::Entity: Send + Sync,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A> + Send + Sync,
    <A::Entity as EntityTrait>::Column: FromStr,
    <<A::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType: From<T::Id>,
    T: Identifiable
        + From<<A::Entity as EntityTrait>::Model>
        + IntoActiveModel<A>
        + Send
        + Sync
        + 'static,
{
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, CrudError> {
        let model = A::Entity::find_by_id(id.clone()).one(&self.db).await?;
        Ok(model.map(T::from))
    }

    async fn find_all(&self, pageable: &Pageable) -> Result<Page<T>, CrudError> {
        let mut select = A::Entity::find();

        if pageable.sort.is_sorted() {
            for order in pageable.sort.iter() {
                match <A::Entity as EntityTrait>::Column::from_str(&order.property) {
                    Ok(column) => {
                        select = select.order_by(column, order.direction.into());
                    }
                    Err(_) => {
                        tracing::warn!(
                            resource = simple_type_name::<T>(),
                            property = %order.property,
                            "Ignoring sort on unknown column"
                        );
                    }
                }
            }
        } else {
            for key in <A::Entity as EntityTrait>::PrimaryKey::iter() {
                select = select.order_by_asc(key.into_column());
            }
        }

        let Some(size) = pageable.size else {
            let models = select.all(&self.db).await?;
            let total = models.len() as u64;
            let content = models.into_iter().map(T::from).collect();
            return Ok(Page::new(content, pageable, total));
        };

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await?;
        // Pages starting past the last record are empty without querying
        if pageable
            .page
            .checked_mul(size)
            .is_none_or(|offset| offset >= total)
        {
            return Ok(Page::new(Vec::new(), pageable, total));
        }
        let models = paginator.fetch_page(pageable.page).await?;
        let content = models.into_iter().map(T::from).collect();
        Ok(Page::new(content, pageable, total))
    }

    async fn save(&self, record: T) -> Result<T, CrudError> {
        let is_new = record.id().is_none();
        let active: A = record.into_active_model();
        let model = if is_new {
            active.insert(&self.db).await?
        } else {
            active.update(&self.db).await?
        };
        Ok(T::from(model))
    }

    async fn delete(&self, record: T) -> Result<(), CrudError> {
        let id = record
            .id()
            .ok_or_else(|| CrudError::delete("Id is not present"))?;
        let active: A = record.into_active_model();
        let result = active.delete(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(CrudError::not_found(
                simple_type_name::<T>(),
                Some(id.to_string()),
            ));
        }
        Ok(())
    }
}
