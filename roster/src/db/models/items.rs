//! Database models for items.

use crate::types::{ItemId, PersonId};
use serde::{Deserialize, Serialize};

/// Database request for creating a new item
#[derive(Debug, Clone)]
pub struct ItemCreateDBRequest {
    pub item_name: String,
    /// Owning person, if already assigned
    pub owner_id: Option<PersonId>,
}

/// Database request for updating an item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdateDBRequest {
    pub item_name: Option<String>,
    /// `Some(None)` unassigns the item
    pub owner_id: Option<Option<PersonId>>,
}

/// Database response for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemDBResponse {
    pub id: ItemId,
    pub item_name: String,
    pub owner_id: Option<PersonId>,
}
