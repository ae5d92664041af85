//! Optimistic synchronization of a local list with a server collection.
//!
//! # Flow
//!
//! 1. [`CollectionSync::load`] replaces the local list with the server's
//! 2. [`CollectionSync::apply_optimistic`] validates a mutation and applies it
//!    to the local list immediately, returning a [`Pending`] ticket
//! 3. [`CollectionSync::commit`] sends the ticket to the server; on failure
//!    the whole collection is refetched (rollback-by-refetch)
//! 4. [`CollectionSync::remove`] drops an item locally, then deletes it on
//!    the server, refetching on failure
//!
//! # Overlapping requests
//!
//! Every optimistic change is stamped with a version and kept as *unsettled*
//! until the server answers. A load replays the unsettled changes on top of
//! the fetched list, so a refetch triggered by one item never hides changes
//! of other items that are still in flight, and a confirmation arriving
//! after that refetch is already reflected locally.
//!
//! A failed commit only refetches when it is the newest change of its item.
//! An older failure is stale: the newer change decides what the item shows.
//! A confirmation supersedes every older change of the same item. Loads
//! carry a generation number; a load finishing after a newer one has been
//! applied is discarded, failures included.
//!
//! The local list sits behind a `std::sync::Mutex` that is only locked in
//! synchronous sections, never across an `.await`.

mod cart;
mod checkout;
mod events;
mod inventory;
mod wishlist;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::SyncError;

pub use cart::{AddToCart, CartMutation, CartSource, CartSync};
pub use checkout::{Checkout, Coupon, PlacedOrder, ShippingAddress};
pub use events::{Notice, Route, Severity, SyncEvent};
pub use inventory::{
    InventoryMutation, InventorySource, InventoryStats, InventorySync, StockForm, ValidStock,
};
pub use wishlist::{WishlistSource, WishlistSync};

/// An element of a synchronized collection.
pub trait CollectionItem: Clone + fmt::Debug + Send + Sync + 'static {
    /// Identifier, unique within the collection.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// A server collection the controller can mirror.
pub trait CollectionSource: Send + Sync {
    type Item: CollectionItem;
    type Mutation: Clone + fmt::Debug + Send + Sync;

    /// Name used in logs and notifications.
    const NAME: &'static str;

    /// Fetch the whole collection.
    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Vec<Self::Item>, ApiError>> + Send;

    /// Whether `mutation` stays within the domain bounds for `item`.
    fn validate(&self, item: &Self::Item, mutation: &Self::Mutation) -> bool;

    /// Apply an already validated mutation in place.
    fn apply(&self, item: &mut Self::Item, mutation: &Self::Mutation);

    /// Send a mutation to the server. `item` is the state after `apply`.
    fn push(
        &self,
        api: &ApiClient,
        item: &Self::Item,
        mutation: &Self::Mutation,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete an item on the server.
    fn delete(
        &self,
        api: &ApiClient,
        id: <Self::Item as CollectionItem>::Id,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Notification shown when the backend rejects the session.
    fn unauthorized_message(&self) -> &'static str {
        "Authentication required. Please log in again."
    }
}

/// An optimistic mutation that has been applied locally but not yet sent.
#[derive(Debug)]
#[must_use = "an applied mutation must be committed or the server never sees it"]
pub struct Pending<T: CollectionItem, M> {
    id: T::Id,
    version: u64,
    item: T,
    mutation: M,
}

impl<T: CollectionItem, M> Pending<T, M> {
    /// Id of the mutated item.
    pub fn id(&self) -> T::Id {
        self.id
    }

    /// The item as it looks locally after the mutation.
    pub const fn item(&self) -> &T {
        &self.item
    }
}

// =============================================================================
// State
// =============================================================================

enum Change<M> {
    Update(M),
    Remove,
}

/// A local change the server has not settled yet.
struct Unsettled<M> {
    version: u64,
    change: Change<M>,
    /// `loads_started` when the server confirmed the change. Loads up to that
    /// generation may have read the collection before the write landed.
    confirmed_at: Option<u64>,
}

impl<M> Unsettled<M> {
    /// Whether a load of `generation` may be missing this change.
    fn missing_from(&self, generation: u64) -> bool {
        self.confirmed_at.is_none_or(|at| at >= generation)
    }
}

struct SyncState<T: CollectionItem, M> {
    items: Vec<T>,
    /// Unsettled changes per item, oldest first.
    unsettled: HashMap<T::Id, Vec<Unsettled<M>>>,
    next_version: u64,
    loads_started: u64,
    loads_running: u64,
    load_applied: u64,
    loaded: bool,
    events: Vec<SyncEvent>,
}

impl<T: CollectionItem, M> SyncState<T, M> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            unsettled: HashMap::new(),
            next_version: 0,
            loads_started: 0,
            loads_running: 0,
            load_applied: 0,
            loaded: false,
            events: Vec::new(),
        }
    }

    fn track(&mut self, id: T::Id, change: Change<M>) -> u64 {
        self.next_version += 1;
        self.unsettled.entry(id).or_default().push(Unsettled {
            version: self.next_version,
            change,
            confirmed_at: None,
        });
        self.next_version
    }

    /// Record a server confirmation. Returns `false` when the change was
    /// already superseded.
    fn confirm(&mut self, id: T::Id, version: u64) -> bool {
        let started = self.loads_started;
        let Some(changes) = self.unsettled.get_mut(&id) else {
            return false;
        };
        let Some(pos) = changes.iter().position(|c| c.version == version) else {
            return false;
        };
        changes.drain(..pos);
        if let Some(confirmed) = changes.first_mut() {
            confirmed.confirmed_at = Some(started);
        }
        self.prune();
        true
    }

    /// Forget a failed change. Returns whether it was the newest change of
    /// its item, i.e. whether the local item still shows it.
    fn fail(&mut self, id: T::Id, version: u64) -> bool {
        let Some(changes) = self.unsettled.get_mut(&id) else {
            return false;
        };
        let Some(pos) = changes.iter().position(|c| c.version == version) else {
            return false;
        };
        changes.remove(pos);
        let newest = pos == changes.len();
        if changes.is_empty() {
            self.unsettled.remove(&id);
        }
        newest
    }

    /// Drop confirmed changes that every load still to be applied has seen.
    fn prune(&mut self) {
        let running = self.loads_running > 0;
        let applied = self.load_applied;
        self.unsettled.retain(|_, changes| {
            changes.retain(|c| match c.confirmed_at {
                None => true,
                Some(at) => running && at >= applied,
            });
            !changes.is_empty()
        });
    }
}

// =============================================================================
// CollectionSync
// =============================================================================

/// Controller keeping a local list consistent with a server collection.
pub struct CollectionSync<S: CollectionSource> {
    api: ApiClient,
    source: S,
    state: Mutex<SyncState<S::Item, S::Mutation>>,
}

impl<S: CollectionSource> fmt::Debug for CollectionSync<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionSync")
            .field("collection", &S::NAME)
            .field("items", &self.len())
            .finish_non_exhaustive()
    }
}

impl<S: CollectionSource> CollectionSync<S> {
    /// Create a controller with an empty local list.
    pub fn new(api: ApiClient, source: S) -> Self {
        Self {
            api,
            source,
            state: Mutex::new(SyncState::new()),
        }
    }

    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    fn state(&self) -> MutexGuard<'_, SyncState<S::Item, S::Mutation>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Local list
    // =========================================================================

    /// Snapshot of the local list.
    pub fn items(&self) -> Vec<S::Item> {
        self.state().items.clone()
    }

    /// Run `f` over the local list without cloning it.
    pub fn with_items<R>(&self, f: impl FnOnce(&[S::Item]) -> R) -> R {
        f(&self.state().items)
    }

    /// The local copy of one item.
    pub fn get(&self, id: <S::Item as CollectionItem>::Id) -> Option<S::Item> {
        self.state().items.iter().find(|item| item.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Whether a load has completed successfully at least once.
    pub fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    /// Drain the notifications and redirects queued since the last call.
    pub fn take_events(&self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.state().events)
    }

    pub(crate) fn emit(&self, event: SyncEvent) {
        debug!(collection = S::NAME, ?event, "Sync event");
        self.state().events.push(event);
    }

    /// Queue the notification (and redirect) matching a failed operation.
    pub(crate) fn report(&self, err: &SyncError, message: &str) {
        if err.is_unauthorized() {
            self.emit(SyncEvent::Notice(Notice::error(
                self.source.unauthorized_message(),
            )));
            self.emit(SyncEvent::Redirect(Route::Login));
        } else {
            self.emit(SyncEvent::Notice(Notice::error(message)));
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace the local list with the server's collection, with unsettled
    /// local changes replayed on top.
    ///
    /// On failure the local list is left untouched and a notification is
    /// queued; a 401/403 also queues a redirect to the login screen. A load
    /// overtaken by a newer applied one changes nothing and queues nothing.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self), fields(collection = S::NAME))]
    pub async fn load(&self) -> Result<(), SyncError> {
        let generation = {
            let mut state = self.state();
            state.loads_started += 1;
            state.loads_running += 1;
            state.loads_started
        };

        let fetched = self.source.fetch(&self.api).await;

        let mut guard = self.state();
        let state = &mut *guard;
        state.loads_running = state.loads_running.saturating_sub(1);
        let overtaken = generation < state.load_applied;
        let result = match fetched {
            Ok(_) if overtaken => {
                debug!(generation, "Discarding load overtaken by a newer one");
                Ok(())
            }
            Ok(items) => {
                self.install(state, generation, items);
                Ok(())
            }
            Err(e) => Err(SyncError::from(e)),
        };
        state.prune();
        drop(guard);

        if let Err(err) = &result {
            if overtaken {
                debug!(error = %err, generation, "Failed load already overtaken");
            } else {
                warn!(error = %err, "Failed to load collection");
                self.report(err, &format!("Failed to fetch {}", S::NAME));
            }
        }
        result
    }

    fn install(
        &self,
        state: &mut SyncState<S::Item, S::Mutation>,
        generation: u64,
        mut items: Vec<S::Item>,
    ) {
        let mut replayed = 0_usize;
        for (id, changes) in &state.unsettled {
            for unsettled in changes.iter().filter(|c| c.missing_from(generation)) {
                replayed += 1;
                match &unsettled.change {
                    Change::Update(mutation) => {
                        if let Some(item) = items.iter_mut().find(|item| item.id() == *id) {
                            if self.source.validate(item, mutation) {
                                self.source.apply(item, mutation);
                            }
                        }
                    }
                    Change::Remove => items.retain(|item| item.id() != *id),
                }
            }
        }

        debug!(count = items.len(), generation, replayed, "Loaded collection");
        state.load_applied = generation;
        state.items = items;
        state.loaded = true;
    }

    /// Validate `mutation` and apply it to the local item right away.
    ///
    /// Returns `None` without touching anything when the item is not held
    /// locally or the mutation is out of bounds.
    pub fn apply_optimistic(
        &self,
        id: <S::Item as CollectionItem>::Id,
        mutation: S::Mutation,
    ) -> Option<Pending<S::Item, S::Mutation>> {
        let mut guard = self.state();
        let state = &mut *guard;

        let Some(item) = state.items.iter_mut().find(|item| item.id() == id) else {
            debug!(collection = S::NAME, %id, "Mutation for item not held locally");
            return None;
        };
        if !self.source.validate(item, &mutation) {
            debug!(collection = S::NAME, %id, ?mutation, "Mutation out of bounds, ignored");
            return None;
        }

        self.source.apply(item, &mutation);
        let item = item.clone();
        let version = state.track(id, Change::Update(mutation.clone()));

        Some(Pending {
            id,
            version,
            item,
            mutation,
        })
    }

    /// Send an applied mutation to the server.
    ///
    /// On failure the collection is reloaded, unless a newer mutation of the
    /// same item has been applied since, in which case the failure is stale
    /// and only reported.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure, after any rollback.
    #[instrument(skip(self, pending), fields(collection = S::NAME, id = %pending.id))]
    pub async fn commit(&self, pending: Pending<S::Item, S::Mutation>) -> Result<(), SyncError> {
        let Err(e) = self
            .source
            .push(&self.api, &pending.item, &pending.mutation)
            .await
        else {
            let current = self.state().confirm(pending.id, pending.version);
            debug!(version = pending.version, current, "Mutation confirmed");
            return Ok(());
        };

        let err = SyncError::from(e);
        let newest = self.state().fail(pending.id, pending.version);
        if newest {
            warn!(error = %err, "Update failed, reloading collection");
            self.emit(SyncEvent::Notice(Notice::error(format!(
                "Failed to update {} item",
                S::NAME
            ))));
            self.rollback().await;
        } else {
            debug!(
                error = %err,
                version = pending.version,
                "Stale update failure ignored"
            );
        }
        Err(err)
    }

    /// [`apply_optimistic`](Self::apply_optimistic) followed by
    /// [`commit`](Self::commit).
    ///
    /// Returns `Ok(false)` when the mutation was rejected locally.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure, after rollback.
    pub async fn update(
        &self,
        id: <S::Item as CollectionItem>::Id,
        mutation: S::Mutation,
    ) -> Result<bool, SyncError> {
        let Some(pending) = self.apply_optimistic(id, mutation) else {
            return Ok(false);
        };
        self.commit(pending).await?;
        Ok(true)
    }

    /// Remove an item locally, then delete it on the server.
    ///
    /// Returns `Ok(false)` without a request when the item is not held
    /// locally, so removing twice has no further effect.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure, after rollback.
    #[instrument(skip(self), fields(collection = S::NAME))]
    pub async fn remove(&self, id: <S::Item as CollectionItem>::Id) -> Result<bool, SyncError> {
        let version = {
            let mut state = self.state();
            let before = state.items.len();
            state.items.retain(|item| item.id() != id);
            if state.items.len() == before {
                debug!(%id, "Item already absent");
                return Ok(false);
            }
            state.track(id, Change::Remove)
        };

        match self.source.delete(&self.api, id).await {
            Ok(()) => {
                self.state().confirm(id, version);
                debug!(%id, "Item deleted");
                Ok(true)
            }
            Err(e) => {
                let err = SyncError::from(e);
                let newest = self.state().fail(id, version);
                if newest {
                    warn!(error = %err, %id, "Delete failed, reloading collection");
                    self.emit(SyncEvent::Notice(Notice::error(format!(
                        "Failed to remove {} item",
                        S::NAME
                    ))));
                    self.rollback().await;
                }
                Err(err)
            }
        }
    }

    /// Discard local state by refetching the collection.
    async fn rollback(&self) {
        if let Err(e) = self.load().await {
            debug!(error = %e, "Reload after failed mutation also failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;
    use crate::config::ClientConfig;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: u32,
        value: i64,
    }

    impl CollectionItem for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    #[derive(Default)]
    struct Server {
        rows: Mutex<Vec<Row>>,
        fail_fetch: Mutex<Option<u16>>,
        fail_writes: Mutex<bool>,
        /// Held fetches read the rows, then wait for the gate to open.
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        fetches: AtomicUsize,
        writes: AtomicUsize,
    }

    struct FakeSource(Arc<Server>);

    fn failure(status: u16) -> ApiError {
        if status == 401 || status == 403 {
            ApiError::Unauthorized { status }
        } else {
            ApiError::Status {
                status,
                body: "boom".to_string(),
            }
        }
    }

    impl CollectionSource for FakeSource {
        type Item = Row;
        type Mutation = i64;

        const NAME: &'static str = "rows";

        async fn fetch(&self, _api: &ApiClient) -> Result<Vec<Row>, ApiError> {
            self.0.fetches.fetch_add(1, Ordering::SeqCst);
            let rows = self.0.rows.lock().unwrap().clone();
            let gate = self.0.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.await.unwrap();
            }
            if let Some(status) = *self.0.fail_fetch.lock().unwrap() {
                return Err(failure(status));
            }
            Ok(rows)
        }

        fn validate(&self, _item: &Row, mutation: &i64) -> bool {
            (1..=10).contains(mutation)
        }

        fn apply(&self, item: &mut Row, mutation: &i64) {
            item.value = *mutation;
        }

        async fn push(&self, _api: &ApiClient, item: &Row, _mutation: &i64) -> Result<(), ApiError> {
            self.0.writes.fetch_add(1, Ordering::SeqCst);
            if *self.0.fail_writes.lock().unwrap() {
                return Err(failure(500));
            }
            let mut rows = self.0.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|row| row.id == item.id) {
                row.value = item.value;
            }
            Ok(())
        }

        async fn delete(&self, _api: &ApiClient, id: u32) -> Result<(), ApiError> {
            self.0.writes.fetch_add(1, Ordering::SeqCst);
            if *self.0.fail_writes.lock().unwrap() {
                return Err(failure(500));
            }
            self.0.rows.lock().unwrap().retain(|row| row.id != id);
            Ok(())
        }
    }

    fn setup(rows: Vec<Row>) -> (Arc<Server>, CollectionSync<FakeSource>) {
        let server = Arc::new(Server {
            rows: Mutex::new(rows),
            ..Server::default()
        });
        let api = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let sync = CollectionSync::new(api, FakeSource(Arc::clone(&server)));
        (server, sync)
    }

    fn row(id: u32, value: i64) -> Row {
        Row { id, value }
    }

    fn hold_next_fetch(server: &Server) -> oneshot::Sender<()> {
        let (open, gate) = oneshot::channel();
        *server.gate.lock().unwrap() = Some(gate);
        open
    }

    #[tokio::test]
    async fn test_load_replaces_local_list() {
        let (server, sync) = setup(vec![row(1, 3), row(2, 5)]);
        assert!(sync.is_empty());
        assert!(!sync.is_loaded());

        sync.load().await.unwrap();
        assert_eq!(sync.items(), vec![row(1, 3), row(2, 5)]);

        server.rows.lock().unwrap().pop();
        sync.load().await.unwrap();
        assert_eq!(sync.items(), vec![row(1, 3)]);
        assert!(sync.take_events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_list() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();

        *server.fail_fetch.lock().unwrap() = Some(500);
        let err = sync.load().await.unwrap_err();
        assert!(matches!(err, SyncError::Operation(_)));
        assert_eq!(sync.items(), vec![row(1, 3)]);
        assert_eq!(
            sync.take_events(),
            vec![SyncEvent::Notice(Notice::error("Failed to fetch rows"))]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_load_redirects() {
        let (server, sync) = setup(vec![row(1, 3)]);
        *server.fail_fetch.lock().unwrap() = Some(403);

        assert!(sync.load().await.unwrap_err().is_unauthorized());
        assert!(sync.is_empty());
        let events = sync.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], SyncEvent::Redirect(Route::Login));
    }

    #[tokio::test]
    async fn test_out_of_range_mutation_is_noop() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();

        for value in [0, 11, -4] {
            assert!(!sync.update(1, value).await.unwrap());
        }
        assert!(!sync.update(99, 4).await.unwrap());
        assert_eq!(sync.items(), vec![row(1, 3)]);
        assert_eq!(server.writes.load(Ordering::SeqCst), 0);
        assert!(sync.take_events().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_apply_is_visible_before_commit() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();

        let pending = sync.apply_optimistic(1, 4).unwrap();
        assert_eq!(pending.item(), &row(1, 4));
        assert_eq!(sync.get(1), Some(row(1, 4)));
        assert_eq!(server.writes.load(Ordering::SeqCst), 0);

        sync.commit(pending).await.unwrap();
        assert_eq!(server.rows.lock().unwrap()[0], row(1, 4));
        assert_eq!(server.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_to_server_state() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();
        *server.fail_writes.lock().unwrap() = true;

        let err = sync.update(1, 4).await.unwrap_err();
        assert!(matches!(err, SyncError::Operation(_)));
        assert_eq!(sync.items(), vec![row(1, 3)]);
        assert_eq!(server.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(
            sync.take_events(),
            vec![SyncEvent::Notice(Notice::error("Failed to update rows item"))]
        );
    }

    #[tokio::test]
    async fn test_stale_commit_failure_does_not_roll_back() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();
        *server.fail_writes.lock().unwrap() = true;

        let first = sync.apply_optimistic(1, 4).unwrap();
        let second = sync.apply_optimistic(1, 5).unwrap();

        assert!(sync.commit(first).await.is_err());
        assert_eq!(sync.get(1), Some(row(1, 5)));
        assert_eq!(server.fetches.load(Ordering::SeqCst), 1);

        assert!(sync.commit(second).await.is_err());
        assert_eq!(sync.get(1), Some(row(1, 3)));
        assert_eq!(server.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (server, sync) = setup(vec![row(1, 3), row(2, 1)]);
        sync.load().await.unwrap();

        assert!(sync.remove(1).await.unwrap());
        assert!(!sync.remove(1).await.unwrap());
        assert_eq!(sync.items(), vec![row(2, 1)]);
        assert_eq!(server.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_remove_restores_item() {
        let (server, sync) = setup(vec![row(1, 3), row(2, 1)]);
        sync.load().await.unwrap();
        *server.fail_writes.lock().unwrap() = true;

        assert!(sync.remove(2).await.is_err());
        assert_eq!(sync.items(), vec![row(1, 3), row(2, 1)]);
    }

    #[tokio::test]
    async fn test_rollback_keeps_other_items_in_flight() {
        let (server, sync) = setup(vec![row(1, 3), row(2, 5)]);
        sync.load().await.unwrap();

        let first = sync.apply_optimistic(1, 4).unwrap();
        let second = sync.apply_optimistic(2, 6).unwrap();

        *server.fail_writes.lock().unwrap() = true;
        assert!(sync.commit(second).await.is_err());
        assert_eq!(sync.items(), vec![row(1, 4), row(2, 5)]);

        *server.fail_writes.lock().unwrap() = false;
        sync.commit(first).await.unwrap();
        assert_eq!(sync.items(), *server.rows.lock().unwrap());
        assert!(sync.state().unsettled.is_empty());
    }

    #[tokio::test]
    async fn test_late_failure_after_reload_still_rolls_back() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();

        let pending = sync.apply_optimistic(1, 4).unwrap();
        sync.load().await.unwrap();
        assert_eq!(sync.get(1), Some(row(1, 4)));

        *server.fail_writes.lock().unwrap() = true;
        assert!(sync.commit(pending).await.is_err());
        assert_eq!(sync.get(1), Some(row(1, 3)));
        assert_eq!(
            sync.take_events(),
            vec![SyncEvent::Notice(Notice::error("Failed to update rows item"))]
        );
    }

    #[tokio::test]
    async fn test_confirmation_during_slow_load_is_kept() {
        let (server, sync) = setup(vec![row(1, 3)]);
        sync.load().await.unwrap();
        let pending = sync.apply_optimistic(1, 4).unwrap();

        // the load reads the row before the write lands
        let open = hold_next_fetch(&server);
        let (loaded, ()) = tokio::join!(sync.load(), async {
            sync.commit(pending).await.unwrap();
            open.send(()).unwrap();
        });
        loaded.unwrap();

        assert_eq!(sync.get(1), Some(row(1, 4)));
        assert_eq!(server.rows.lock().unwrap()[0], row(1, 4));
        assert!(sync.state().unsettled.is_empty());
    }

    #[tokio::test]
    async fn test_overtaken_load_failure_is_silent() {
        let (server, sync) = setup(vec![row(1, 3)]);

        let open = hold_next_fetch(&server);
        let (slow, ()) = tokio::join!(sync.load(), async {
            tokio::task::yield_now().await;
            sync.load().await.unwrap();
            *server.fail_fetch.lock().unwrap() = Some(401);
            open.send(()).unwrap();
        });

        assert!(slow.unwrap_err().is_unauthorized());
        assert_eq!(sync.items(), vec![row(1, 3)]);
        assert!(sync.take_events().is_empty());
    }
}
