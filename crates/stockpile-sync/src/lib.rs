//! # stockpile-sync: Cache-First Repository
//!
//! Mediates between the local store and the remote source of truth.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         stockpile-sync                                  │
//! │                                                                         │
//! │   caller ──► StockRepository ──┬──► LocalStore      (store.rs)          │
//! │      ▲       (repository.rs)   │      └─ stockpile_db::ProductRepository │
//! │      │                         └──► RemoteTransport (transport.rs)      │
//! │      │                                └─ HttpTransport (reqwest)        │
//! │      │                                                                  │
//! │      └──── Dispatcher (dispatch.rs) ◄── LoadListener / SaveCallback     │
//! │                                          (listener.rs)                  │
//! │                                                                         │
//! │   StockpileConfig (config.rs): database, remote, repository settings    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockpile_sync::{
//!     callback, notification_channel, HttpTransport, StockRepository, StockpileConfig,
//! };
//!
//! let config = StockpileConfig::load(None)?;
//! let db = stockpile_db::Database::new(config.database.to_db_config()?).await?;
//! let (dispatcher, mut queue) = notification_channel();
//!
//! let repository = StockRepository::new(
//!     Arc::new(db.products()),
//!     Arc::new(HttpTransport::new(&config.remote)?),
//!     Arc::new(dispatcher),
//!     config.repository.clone(),
//! );
//!
//! repository.fetch_all(|products: Vec<_>| println!("{} products", products.len()));
//! queue.run_next().await;
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod repository;
pub mod store;
pub mod transport;

pub use config::{
    DatabaseSettings, EmptyBodyPolicy, RefreshErrorPolicy, RemoteSettings, RepositorySettings,
    StockpileConfig,
};
pub use dispatch::{
    notification_channel, ChannelDispatcher, Dispatcher, InlineDispatcher, Notification,
    NotificationQueue,
};
pub use error::{SyncError, SyncResult};
pub use listener::{callback, FnCallback, LoadFailure, LoadListener, SaveCallback, SaveFailure};
pub use repository::StockRepository;
pub use store::LocalStore;
pub use transport::{HttpTransport, RemoteResponse, RemoteTransport};
