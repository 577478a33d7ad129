//! # Repository Module
//!
//! SQL-backed repositories for the local store.
//!
//! ```text
//! StockRepository (stockpile-sync)
//!      │  LocalStore trait: list_all / upsert_many / upsert_one / get_by_id
//!      ▼
//! ProductRepository (this module)
//!      │  SQL
//!      ▼
//! SQLite `products` table
//! ```
//!
//! - [`ProductRepository`](product::ProductRepository) - product reads and atomic upserts

pub mod product;
