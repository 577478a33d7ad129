//! # Stock Repository
//!
//! Cache-first access to the product collection. Reads are served from the
//! local store first and refreshed from the remote in the background; writes
//! go to the remote first and are persisted locally only once confirmed.
//!
//! ## Read Flow (`fetch_all`)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller            worker task                  completion context      │
//! │    │                                                                    │
//! │    ├─ fetch_all ──► store.list_all()                                    │
//! │    │  (returns)          │                                              │
//! │    │                     ├─ dispatch ──────────► on_loaded(local)       │
//! │    │                     │◄──────────── ack ──────────┘                 │
//! │    │                     ▼                                              │
//! │    │               transport.list_all()                                 │
//! │    │                 ok  ──► store.upsert_many(remote)  (one txn)       │
//! │    │                 err ──► warn!  (+ on_failure under Report)         │
//! │    │                     ▼                                              │
//! │    │               store.list_all()                                     │
//! │    │                     └─ dispatch ──────────► on_loaded(merged)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Flow (`save`)
//! ```text
//! transport.save(p)
//!   ├─ no response       ──► on_failure(Communication)
//!   ├─ non-2xx           ──► on_failure(UnsuccessfulResponse)
//!   ├─ 2xx, no body      ──► EmptyBodyPolicy (Ignore: nothing at all)
//!   └─ 2xx, body b       ──► store.upsert_one(b) ──► store.get_by_id(id)
//!                               └──► on_success(persisted)
//! ```
//!
//! Nothing touches the local store on the write path until the remote has
//! accepted the product.

use std::sync::Arc;

use tokio::sync::{oneshot, AcquireError, Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use stockpile_core::Product;

use crate::config::{EmptyBodyPolicy, RefreshErrorPolicy, RepositorySettings};
use crate::dispatch::{Dispatcher, Notification};
use crate::error::SyncError;
use crate::listener::{LoadFailure, LoadListener, SaveCallback, SaveFailure};
use crate::store::LocalStore;
use crate::transport::RemoteTransport;

/// Cache-first product repository.
///
/// Cheap to clone: clones share collaborators and the worker pool.
///
/// ## Usage
/// ```rust,ignore
/// let (dispatcher, mut queue) = notification_channel();
/// let repository = StockRepository::new(
///     Arc::new(db.products()),
///     Arc::new(HttpTransport::new(&config.remote)?),
///     Arc::new(dispatcher),
///     config.repository.clone(),
/// );
///
/// repository.fetch_all(|products: Vec<Product>| render(&products));
/// while queue.run_next().await { /* UI loop */ }
/// ```
#[derive(Clone)]
pub struct StockRepository {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn LocalStore>,
    transport: Arc<dyn RemoteTransport>,
    dispatcher: Arc<dyn Dispatcher>,
    workers: Semaphore,
    settings: RepositorySettings,
}

impl StockRepository {
    /// Creates a repository over its collaborators.
    pub fn new(
        store: Arc<dyn LocalStore>,
        transport: Arc<dyn RemoteTransport>,
        dispatcher: Arc<dyn Dispatcher>,
        settings: RepositorySettings,
    ) -> Self {
        debug!(
            workers = settings.workers,
            refresh_errors = %settings.refresh_errors,
            empty_body = %settings.empty_body,
            "Creating stock repository"
        );

        StockRepository {
            inner: Arc::new(Inner {
                store,
                transport,
                dispatcher,
                workers: Semaphore::new(settings.workers.max(1)),
                settings,
            }),
        }
    }

    /// Loads the collection, local first, then refreshed from the remote.
    ///
    /// `listener.on_loaded` receives the local snapshot, then (after it has
    /// run) the snapshot taken after reconciliation. Returns immediately.
    pub fn fetch_all<L>(&self, listener: L) -> JoinHandle<()>
    where
        L: LoadListener<Vec<Product>>,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_fetch_all(Arc::new(listener)).await })
    }

    /// Saves a product remotely, then persists the confirmed copy locally.
    ///
    /// Exactly one of `on_success`/`on_failure` runs, except for an empty
    /// success body under `EmptyBodyPolicy::Ignore`, where neither does.
    pub fn save<C>(&self, product: Product, callback: C) -> JoinHandle<()>
    where
        C: SaveCallback<Product>,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.run_save(product).await {
                Ok(Some(persisted)) => {
                    info!(id = ?persisted.id, "Product saved");
                    inner.notify(Box::new(move || callback.on_success(persisted)));
                }
                Ok(None) => {
                    debug!("Remote confirmed save without a body, no callback");
                }
                Err(failure) => {
                    warn!(error = %failure, "Product save failed");
                    inner.notify(Box::new(move || callback.on_failure(failure)));
                }
            }
        })
    }

    /// Stops accepting work. Stages that have not started yet fail with
    /// `WorkerPoolClosed`.
    pub fn shutdown(&self) {
        info!("Shutting down stock repository");
        self.inner.workers.close();
    }
}

impl std::fmt::Debug for StockRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockRepository")
            .field("settings", &self.inner.settings)
            .field("available_workers", &self.inner.workers.available_permits())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Flows
// =============================================================================

impl Inner {
    async fn run_fetch_all<L>(&self, listener: Arc<L>)
    where
        L: LoadListener<Vec<Product>>,
    {
        let local = match self.read_local().await {
            Ok(products) => products,
            Err(failure) => return self.notify_load_failure(&listener, failure),
        };

        debug!(count = local.len(), "Delivering local snapshot");
        let first = Arc::clone(&listener);
        self.notify_and_wait(Box::new(move || first.on_loaded(local)))
            .await;

        match self.refresh().await {
            Ok(count) => debug!(count, "Local store reconciled with remote"),
            Err(LoadFailure::Refresh(err)) => {
                warn!(error = %err, "Remote refresh failed, keeping local data");
                if self.settings.refresh_errors == RefreshErrorPolicy::Report {
                    self.notify_load_failure(&listener, LoadFailure::Refresh(err));
                }
            }
            Err(failure) => return self.notify_load_failure(&listener, failure),
        }

        let merged = match self.read_local().await {
            Ok(products) => products,
            Err(failure) => return self.notify_load_failure(&listener, failure),
        };

        debug!(count = merged.len(), "Delivering refreshed snapshot");
        self.notify(Box::new(move || listener.on_loaded(merged)));
    }

    async fn read_local(&self) -> Result<Vec<Product>, LoadFailure> {
        let _permit = self
            .permit()
            .await
            .map_err(|_| LoadFailure::WorkerPoolClosed)?;

        self.store.list_all().await.map_err(LoadFailure::LocalStore)
    }

    /// Pulls the remote collection into the local store. Returns how many
    /// products were upserted.
    async fn refresh(&self) -> Result<usize, LoadFailure> {
        let _permit = self
            .permit()
            .await
            .map_err(|_| LoadFailure::WorkerPoolClosed)?;

        let remote = self
            .transport
            .list_all()
            .await
            .map_err(LoadFailure::Refresh)?;

        self.store
            .upsert_many(&remote)
            .await
            .map_err(LoadFailure::LocalStore)?;

        Ok(remote.len())
    }

    async fn run_save(&self, product: Product) -> Result<Option<Product>, SaveFailure> {
        let _permit = self
            .permit()
            .await
            .map_err(|_| SaveFailure::WorkerPoolClosed)?;

        let response = self
            .transport
            .save(&product)
            .await
            .map_err(SaveFailure::Communication)?;

        if !response.is_success() {
            return Err(SaveFailure::UnsuccessfulResponse {
                status: response.status,
            });
        }

        let confirmed = match response.body {
            Some(body) => body,
            None => match self.settings.empty_body {
                EmptyBodyPolicy::Ignore => return Ok(None),
                EmptyBodyPolicy::Fail => return Err(SaveFailure::EmptyBody),
                EmptyBodyPolicy::EchoRequest => product,
            },
        };

        let id = self
            .store
            .upsert_one(&confirmed)
            .await
            .map_err(SaveFailure::LocalStore)?;

        let persisted = self
            .store
            .get_by_id(id)
            .await
            .map_err(SaveFailure::LocalStore)?
            .ok_or_else(|| {
                SaveFailure::LocalStore(SyncError::DatabaseError(format!(
                    "product {id} missing after upsert"
                )))
            })?;

        Ok(Some(persisted))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn permit(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.workers.acquire().await
    }

    fn notify(&self, notification: Notification) {
        let _ = self.dispatcher.dispatch(notification);
    }

    /// Dispatches and waits until the notification has run. Returns early if
    /// the notification is dropped instead.
    async fn notify_and_wait(&self, notification: Notification) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.notify(Box::new(move || {
            notification();
            let _ = ack_tx.send(());
        }));
        let _ = ack_rx.await;
    }

    fn notify_load_failure<L>(&self, listener: &Arc<L>, failure: LoadFailure)
    where
        L: LoadListener<Vec<Product>>,
    {
        let listener = Arc::clone(listener);
        self.notify(Box::new(move || listener.on_failure(failure)));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
