//! Request and response data structures for the HTTP surface.
//!
//! - [`people`]: person forms, search parameters and view models
//! - [`items`]: item forms and view models

pub mod items;
pub mod people;
