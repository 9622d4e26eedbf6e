//! API request/response models for items.

use crate::db::models::items::ItemDBResponse;
use crate::types::{ItemId, PersonId};
use serde::{Deserialize, Serialize};

/// Form submission adding an item to a person
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub item_name: String,
}

/// Query parameters for `/items`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItemsQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub item_name: String,
    pub owner_id: Option<PersonId>,
}

impl From<ItemDBResponse> for ItemResponse {
    fn from(db: ItemDBResponse) -> Self {
        Self {
            id: db.id,
            item_name: db.item_name,
            owner_id: db.owner_id,
        }
    }
}
