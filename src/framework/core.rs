//! # Core Actor Framework
//!
//! This module defines the generic building blocks for the shared store.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait that every keyed resource (counters, audit logs) implements.
//! - [`ResourceActor`]: The generic actor that owns a keyed collection of entities.
//! - [`ResourceClient`]: The generic client for communicating with actors.
//! - [`FrameworkError`]: Common errors (e.g., ActorClosed, NotFound).

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any keyed resource must implement to be managed by [`ResourceActor`].
///
/// # Architecture Note
/// The store keeps two very different resources (stock counters and audit logs), but
/// both are "a value behind a key that only changes through well-defined operations".
/// Writing the request loop once against this contract gives both of them the same
/// guarantee: every operation on a key runs to completion before the next one starts.
///
/// # Keys are chosen by the caller
/// Unlike an auto-incrementing id, counters are addressed by well-known keys
/// (`warehouse:part:7`). `from_create_params` builds the entity and [`ActorEntity::id`]
/// tells the actor where to store it. Creating an existing key replaces it, which is
/// exactly the `SET` semantics the bootstrap needs.
///
/// # Async & Context
/// The trait is `#[async_trait]` so hooks may call other actors. The `Context` type
/// is injected into every hook when the actor is started ("late binding").
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The key this entity lives under.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create (or overwrite) an instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `Increment`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The key of this instance.
    fn id(&self) -> Self::Id;

    /// Construct the full entity from its creation payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(params: Self::Create) -> Result<Self, Self::Error>;

    /// Entity to materialize when an action targets a key that does not exist yet.
    ///
    /// Returning `None` (the default) makes such actions fail with
    /// [`FrameworkError::NotFound`].
    fn materialize(_id: &Self::Id) -> Option<Self> {
        None
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Borrow the entity error if this is one of type `E`.
    pub fn entity_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            FrameworkError::EntityError(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants follow the resource lifecycle the store needs:
///
/// - **Create**: `SET`. Builds an entity from [`ActorEntity::Create`] and stores it
///   under its own key, replacing any previous value.
/// - **Get**: Fetches the current state of one key.
/// - **List**: Fetches every entity (used for end-of-run snapshots).
/// - **Update**: State mutation through [`ActorEntity::Update`].
/// - **Action**: Executes a custom [`ActorEntity::Action`] (e.g. `INCRBY`).
///
/// There is no delete: keys live for the whole simulation.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that manages a keyed collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state (`store`) and
/// the receiver end of the channel.
///
/// **Concurrency Model**:
/// Requests are processed *sequentially*, so an `Increment` and a `Decrement` on the
/// same key can never interleave. That is what makes counter operations atomic
/// without a `Mutex` around the map.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Counter" instead of "kanban_supply_chain::model::counter::Counter")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    match T::from_create_params(params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            let id = item.id();
                            let replaced = self.store.insert(id.clone(), item).is_some();
                            debug!(entity_type, %id, replaced, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(update, &context).await {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        debug!(entity_type, %id, "Updated");
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if !self.store.contains_key(&id) {
                        if let Some(fresh) = T::materialize(&id) {
                            self.store.insert(id.clone(), fresh);
                        }
                    }
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => debug!(entity_type, %id, "Action ok"),
                            Err(e) => debug!(entity_type, %id, error = %e, "Action rejected"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a `ResourceActor`.
///
/// Holds only a sender, so it is cheap to clone and share across node tasks.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Manual impl: `T` itself does not need to be `Clone` for the sender to be.
impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Create { params, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::List { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Update {
                id,
                update,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Action {
                id,
                action,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Tally {
        name: String,
        hits: u32,
    }

    #[derive(Debug)]
    struct TallyCreate {
        name: String,
        hits: u32,
    }

    #[derive(Debug)]
    struct TallyUpdate {
        hits: u32,
    }

    #[derive(Debug)]
    enum TallyAction {
        Hit,
        Miss,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("tally miss")]
    struct TallyError;

    #[async_trait]
    impl ActorEntity for Tally {
        type Id = String;
        type Create = TallyCreate;
        type Update = TallyUpdate;
        type Action = TallyAction;
        type ActionResult = u32;
        type Context = ();
        type Error = TallyError;

        fn id(&self) -> String {
            self.name.clone()
        }

        fn from_create_params(params: TallyCreate) -> Result<Self, TallyError> {
            Ok(Self {
                name: params.name,
                hits: params.hits,
            })
        }

        fn materialize(id: &String) -> Option<Self> {
            Some(Self {
                name: id.clone(),
                hits: 0,
            })
        }

        async fn on_update(&mut self, update: TallyUpdate, _ctx: &()) -> Result<(), TallyError> {
            self.hits = update.hits;
            Ok(())
        }

        async fn handle_action(&mut self, action: TallyAction, _ctx: &()) -> Result<u32, TallyError> {
            match action {
                TallyAction::Hit => {
                    self.hits += 1;
                    Ok(self.hits)
                }
                TallyAction::Miss => Err(TallyError),
            }
        }
    }

    // --- Test ---

    #[tokio::test]
    async fn test_resource_actor_keyed_lifecycle() {
        let (actor, client) = ResourceActor::<Tally>::new(10);
        tokio::spawn(actor.run(()));

        // Create stores under the caller-chosen key
        let id = client
            .create(TallyCreate { name: "a".into(), hits: 5 })
            .await
            .unwrap();
        assert_eq!(id, "a");

        // Create on an existing key replaces it
        client
            .create(TallyCreate { name: "a".into(), hits: 1 })
            .await
            .unwrap();
        assert_eq!(client.get("a".into()).await.unwrap().unwrap().hits, 1);

        // Actions materialize missing keys
        let hits = client.perform_action("b".into(), TallyAction::Hit).await.unwrap();
        assert_eq!(hits, 1);

        // Entity errors travel back boxed and can be downcast
        let err = client
            .perform_action("a".into(), TallyAction::Miss)
            .await
            .unwrap_err();
        assert!(err.entity_error::<TallyError>().is_some());

        // Update
        let updated = client.update("a".into(), TallyUpdate { hits: 9 }).await.unwrap();
        assert_eq!(updated.hits, 9);

        // Update on a missing key is NotFound
        let missing = client.update("zzz".into(), TallyUpdate { hits: 1 }).await;
        assert!(matches!(missing, Err(FrameworkError::NotFound(_))));

        let mut all = client.list().await.unwrap();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], Tally { name: "b".into(), hits: 1 });
    }

    #[tokio::test]
    async fn test_client_reports_closed_actor() {
        let (actor, client) = ResourceActor::<Tally>::new(1);
        drop(actor);
        let result = client.get("a".into()).await;
        assert!(matches!(result, Err(FrameworkError::ActorClosed)));
    }
}
