//! Database record models matching table schemas.
//!
//! Request structs carry insert and update data into repositories; response structs derive
//! `sqlx::FromRow` and mirror the selected columns.

pub mod items;
pub mod people;
