//! HTTP request handlers, organized by resource.
//!
//! Handlers parse and validate input, call one service method and answer with either a
//! rendered [`crate::views::View`] or a `303 See Other` redirect.
//!
//! - [`people`]: person CRUD, search and the HTML-form method override
//! - [`items`]: item lookup and adding items to a person

pub mod items;
pub mod people;
