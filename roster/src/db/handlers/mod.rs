//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction and implements the [`Repository`]
//! trait for one table. Multi-statement writes open a nested transaction on the wrapped
//! connection, so they commit or roll back as a unit.
//!
//! # Available Repositories
//!
//! - [`People`]: people, including the joined person-with-items fetch
//! - [`Items`]: items and their owner links
//!
//! ```ignore
//! use roster::db::handlers::{People, Repository};
//!
//! let mut tx = pool.begin().await?;
//! let everyone = People::new(&mut tx).list_with_items().await?;
//! tx.commit().await?;
//! ```

pub mod items;
pub mod people;
pub mod repository;

pub use items::{ItemFilter, Items};
pub use people::{People, PersonFilter};
pub use repository::Repository;
