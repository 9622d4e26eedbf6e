//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  (transaction boundaries, not-found rules)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! Schema changes live in `migrations/` and are embedded with [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;

