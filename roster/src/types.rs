//! Common type definitions.
//!
//! Entity IDs are SQLite `INTEGER PRIMARY KEY` values (surrogate keys assigned by the store on
//! insert), wrapped in type aliases so signatures say which table they point at.
//!
//! - [`PersonId`]: row id in the `person` table
//! - [`ItemId`]: row id in the `item` table

pub type PersonId = i64;
pub type ItemId = i64;
