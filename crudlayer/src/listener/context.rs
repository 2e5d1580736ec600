use std::any::{Any, TypeId};
use std::sync::Arc;

use super::{
    CreateListener, CrudAction, CrudListener, DeleteListener, Joinpoint, ReadListener,
    UpdateListener, WriteListener,
};
use crate::errors::CrudError;

type Callback = Arc<dyn Fn(&dyn Any, CrudAction) -> Result<(), CrudError> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    actions: Vec<CrudAction>,
    joinpoint: Joinpoint,
    callback: Callback,
}

impl Registration {
    fn matches(&self, type_id: TypeId, action: CrudAction, joinpoint: Joinpoint) -> bool {
        self.type_id == type_id && self.joinpoint == joinpoint && self.actions.contains(&action)
    }
}

/// Registry and dispatcher of CRUD listeners.
///
/// Registrations are matched on the exact runtime type of the notified object,
/// the action and the joinpoint, and invoked in registration order.
///
/// ```ignore
/// let mut listeners = ListenerContext::new();
/// listeners.on::<Note, _>(Joinpoint::Before, &[CrudAction::Create], |note, _| {
///     tracing::info!(title = ?note.title, "creating note");
///     Ok(())
/// });
/// listeners.add_write_listener(Arc::new(AuditLog::default()));
/// ```
#[derive(Clone, Default)]
pub struct ListenerContext {
    registrations: Vec<Registration>,
}

impl ListenerContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure for objects of type `T`
    pub fn on<T, F>(
        &mut self,
        joinpoint: Joinpoint,
        actions: &[CrudAction],
        listener: F,
    ) -> &mut Self
    where
        T: 'static,
        F: Fn(&T, CrudAction) -> Result<(), CrudError> + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(move |object: &dyn Any, action: CrudAction| {
            match object.downcast_ref::<T>() {
                Some(object) => listener(object, action),
                None => Ok(()),
            }
        });
        self.registrations.push(Registration {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            actions: actions.to_vec(),
            joinpoint,
            callback,
        });
        self
    }

    pub fn add_read_listener<T, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        T: 'static,
        L: ReadListener<T> + 'static,
    {
        self.on::<T, _>(Joinpoint::After, &[CrudAction::Read], move |object, _| {
            listener.on_read(object)
        })
    }

    pub fn add_create_listener<T, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        T: 'static,
        L: CreateListener<T> + 'static,
    {
        let joinpoint = listener.joinpoint();
        self.on::<T, _>(joinpoint, &[CrudAction::Create], move |object, _| {
            listener.on_create(object)
        })
    }

    pub fn add_update_listener<T, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        T: 'static,
        L: UpdateListener<T> + 'static,
    {
        let joinpoint = listener.joinpoint();
        self.on::<T, _>(
            joinpoint,
            &[CrudAction::Update, CrudAction::Patch],
            move |object, action| match action {
                CrudAction::Patch => listener.on_patch(object),
                _ => listener.on_update(object),
            },
        )
    }

    pub fn add_delete_listener<T, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        T: 'static,
        L: DeleteListener<T> + 'static,
    {
        let joinpoint = listener.joinpoint();
        self.on::<T, _>(joinpoint, &[CrudAction::Delete], move |object, _| {
            listener.on_delete(object)
        })
    }

    pub fn add_write_listener<T, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        T: 'static,
        L: WriteListener<T> + 'static,
    {
        let joinpoint = listener.joinpoint();
        self.on::<T, _>(joinpoint, &CrudAction::WRITES, move |object, action| {
            listener.on_write(object, action)
        })
    }

    /// Registers twice: reads at `After`, writes at the listener's joinpoint
    pub fn add_crud_listener<T, L>(&mut self, listener: Arc<L>) -> &mut Self
    where
        T: 'static,
        L: CrudListener<T> + 'static,
    {
        let reads = Arc::clone(&listener);
        self.on::<T, _>(Joinpoint::After, &[CrudAction::Read], move |object, action| {
            reads.on_action(object, action)
        });
        let joinpoint = listener.joinpoint();
        self.on::<T, _>(joinpoint, &CrudAction::WRITES, move |object, action| {
            listener.on_action(object, action)
        })
    }

    /// Invoke every matching registration in order, stopping at the first error
    ///
    /// # Errors
    /// The first error returned by a listener, unchanged.
    pub fn notify<T: 'static>(
        &self,
        object: &T,
        action: CrudAction,
        joinpoint: Joinpoint,
    ) -> Result<(), CrudError> {
        let type_id = TypeId::of::<T>();
        for registration in self
            .registrations
            .iter()
            .filter(|r| r.matches(type_id, action, joinpoint))
        {
            tracing::trace!(
                listener_type = registration.type_name,
                %action,
                %joinpoint,
                "Dispatching listener"
            );
            (registration.callback)(object, action)?;
        }
        Ok(())
    }

    /// # Errors
    /// The first listener error.
    pub fn after_read<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Read, Joinpoint::After)
    }

    /// # Errors
    /// The first listener error.
    pub fn before_create<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Create, Joinpoint::Before)
    }

    /// # Errors
    /// The first listener error.
    pub fn after_create<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Create, Joinpoint::After)
    }

    /// # Errors
    /// The first listener error.
    pub fn before_update<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Update, Joinpoint::Before)
    }

    /// # Errors
    /// The first listener error.
    pub fn after_update<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Update, Joinpoint::After)
    }

    /// # Errors
    /// The first listener error.
    pub fn before_patch<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Patch, Joinpoint::Before)
    }

    /// # Errors
    /// The first listener error.
    pub fn after_patch<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Patch, Joinpoint::After)
    }

    /// # Errors
    /// The first listener error.
    pub fn before_delete<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Delete, Joinpoint::Before)
    }

    /// # Errors
    /// The first listener error.
    pub fn after_delete<T: 'static>(&self, object: &T) -> Result<(), CrudError> {
        self.notify(object, CrudAction::Delete, Joinpoint::After)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl std::fmt::Debug for ListenerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.registrations
                    .iter()
                    .map(|r| (r.type_name, &r.actions, r.joinpoint)),
            )
            .finish()
    }
}
