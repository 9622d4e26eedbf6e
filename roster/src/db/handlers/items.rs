//! Database repository for items.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::items::{ItemCreateDBRequest, ItemDBResponse, ItemUpdateDBRequest},
    },
    types::{ItemId, PersonId},
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::instrument;

const ITEM_COLUMNS: &str = "id, item_name, person_id AS owner_id";

/// Filter for listing items
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Only items owned by this person
    pub owner_id: Option<PersonId>,
}

pub struct Items<'c> {
    db: &'c mut SqliteConnection,
    round_trips: usize,
}

#[async_trait::async_trait]
impl<'c> Repository for Items<'c> {
    type CreateRequest = ItemCreateDBRequest;
    type UpdateRequest = ItemUpdateDBRequest;
    type Response = ItemDBResponse;
    type Id = ItemId;
    type Filter = ItemFilter;

    #[instrument(skip(self, request), fields(item_name = %request.item_name, owner_id = ?request.owner_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as::<_, ItemDBResponse>(&format!(
            "INSERT INTO item (item_name, person_id) VALUES (?, ?) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&request.item_name)
        .bind(request.owner_id)
        .fetch_one(&mut *self.db)
        .await?;
        self.round_trips += 1;

        Ok(item)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as::<_, ItemDBResponse>(&format!("SELECT {ITEM_COLUMNS} FROM item WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(item)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<ItemId>) -> Result<HashMap<Self::Id, ItemDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM item WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let items = query.build_query_as::<ItemDBResponse>().fetch_all(&mut *self.db).await?;
        self.round_trips += 1;

        Ok(items.into_iter().map(|i| (i.id, i)).collect())
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM item"));
        if let Some(owner_id) = filter.owner_id {
            query.push(" WHERE person_id = ").push_bind(owner_id);
        }
        query.push(" ORDER BY id");

        let items = query.build_query_as::<ItemDBResponse>().fetch_all(&mut *self.db).await?;
        self.round_trips += 1;

        Ok(items)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM item WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as::<_, ItemDBResponse>(&format!(
            "UPDATE item SET
                item_name = COALESCE(?, item_name),
                person_id = CASE WHEN ? THEN ? ELSE person_id END
             WHERE id = ?
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&request.item_name)
        .bind(request.owner_id.is_some())
        .bind(request.owner_id.flatten())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound);
        self.round_trips += 1;

        item
    }
}

impl<'c> Items<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db, round_trips: 0 }
    }

    /// Number of statements this repository has sent to the store
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    /// Exact-name lookup across all owners
    #[instrument(skip(self), err)]
    pub async fn find_by_item_name(&mut self, item_name: &str) -> Result<Vec<ItemDBResponse>> {
        let items = sqlx::query_as::<_, ItemDBResponse>(&format!("SELECT {ITEM_COLUMNS} FROM item WHERE item_name = ? ORDER BY id"))
            .bind(item_name)
            .fetch_all(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(items)
    }

    /// Items of one person. Calling this once per listed person is the lazy path the joined
    /// fetch in [`crate::db::handlers::People::list_with_items`] replaces.
    #[instrument(skip(self), err)]
    pub async fn find_by_owner(&mut self, owner_id: PersonId) -> Result<Vec<ItemDBResponse>> {
        self.list(&ItemFilter { owner_id: Some(owner_id) }).await
    }
}
