//! Service layer between the HTTP handlers and the repositories.
//!
//! Services own transaction boundaries: every public method opens one transaction on the
//! pool, runs its repository calls inside it and commits. They also turn "no such row"
//! outcomes into [`crate::errors::Error::NotFound`].

pub mod items;
pub mod people;

pub use items::ItemsService;
pub use people::PeopleService;
