//! # stockpile-core: Domain Types for Stockpile
//!
//! This crate holds the managed record type and nothing else. It has zero
//! I/O dependencies so every other crate can share it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockpile Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller (CLI / UI)                            │   │
//! │  │         fetch_all(listener)        save(product, callback)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockpile-sync (StockRepository)               │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐   ┌───────────────▼───────────────┐   │
//! │  │  stockpile-db (LocalStore)  │   │  HttpTransport (remote)       │   │
//! │  └─────────────────────────────┘   └───────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ stockpile-core (THIS CRATE) ★                   │   │
//! │  │                     Product, ProductId                          │   │
//! │  │             NO I/O • NO DATABASE • NO NETWORK                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use stockpile_core::Product;
//!
//! let pen = Product::new("Pen", 150, 10);
//! assert!(!pen.has_id());
//!
//! let stored = pen.with_id(1);
//! assert_eq!(stored.id, Some(1));
//! assert!(stored.same_fields_as(&Product::new("Pen", 150, 10)));
//! ```

pub mod types;

pub use types::*;
