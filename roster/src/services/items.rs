use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::{
    db::{
        handlers::{Items, People, Repository},
        models::items::{ItemCreateDBRequest, ItemDBResponse},
    },
    errors::{Error, Result},
    types::{ItemId, PersonId},
};

/// Service for item lookups and for attaching items to existing people
#[derive(Clone)]
pub struct ItemsService {
    db: SqlitePool,
}

impl ItemsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_item_name(&self, item_name: &str) -> Result<Vec<ItemDBResponse>> {
        let mut tx = self.db.begin().await?;
        let items = Items::new(&mut tx).find_by_item_name(item_name).await?;
        tx.commit().await?;

        Ok(items)
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_owner(&self, owner_id: PersonId) -> Result<Vec<ItemDBResponse>> {
        let mut tx = self.db.begin().await?;
        let items = Items::new(&mut tx).find_by_owner(owner_id).await?;
        tx.commit().await?;

        Ok(items)
    }

    /// Give a new item to an existing person
    #[instrument(skip(self), err)]
    pub async fn add_item(&self, owner_id: PersonId, item_name: String) -> Result<ItemDBResponse> {
        let mut tx = self.db.begin().await?;

        if People::new(&mut tx).get_by_id(owner_id).await?.is_none() {
            warn!("Cannot add item to unknown person: {owner_id}");
            return Err(Error::NotFound {
                resource: "Person".to_string(),
                id: owner_id.to_string(),
            });
        }

        let item = Items::new(&mut tx)
            .create(&ItemCreateDBRequest {
                item_name,
                owner_id: Some(owner_id),
            })
            .await?;
        tx.commit().await?;

        info!("Added item {} to person {owner_id}", item.id);
        Ok(item)
    }

    #[instrument(skip(self), err)]
    pub async fn remove_item(&self, id: ItemId) -> Result<()> {
        let mut tx = self.db.begin().await?;
        if !Items::new(&mut tx).delete(id).await? {
            return Err(Error::NotFound {
                resource: "Item".to_string(),
                id: id.to_string(),
            });
        }
        tx.commit().await?;

        info!("Removed item {id}");
        Ok(())
    }
}
