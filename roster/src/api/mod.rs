//! HTTP layer: route handlers and the form and view models they exchange.
//!
//! - **[`handlers`]**: Axum route handlers rendering server-side views
//! - **[`models`]**: Form submissions, query parameters and view models

pub mod handlers;
pub mod models;
