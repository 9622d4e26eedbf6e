//! Database repository for people.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::{
            items::ItemDBResponse,
            people::{PersonCreateDBRequest, PersonDBResponse, PersonUpdateDBRequest, PersonWithItemsDBResponse},
        },
    },
    types::PersonId,
};
use sqlx::{Connection, FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::{debug, instrument};

const PERSON_COLUMNS: &str = "id, name, age, email, date_of_birth, created_at, mood";

/// Filter for listing people
#[derive(Debug, Clone)]
pub struct PersonFilter {
    pub skip: i64,
    /// Maximum rows to return; negative means no limit
    pub limit: i64,
}

impl PersonFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// Every row, no pagination
    pub fn all() -> Self {
        Self { skip: 0, limit: -1 }
    }
}

// One row of the person-item outer join: the person columns plus a possibly missing item.
#[derive(Debug, FromRow)]
struct PersonItemRow {
    #[sqlx(flatten)]
    person: PersonDBResponse,
    item_id: Option<i64>,
    item_name: Option<String>,
}

pub struct People<'c> {
    db: &'c mut SqliteConnection,
    round_trips: usize,
}

#[async_trait::async_trait]
impl<'c> Repository for People<'c> {
    type CreateRequest = PersonCreateDBRequest;
    type UpdateRequest = PersonUpdateDBRequest;
    type Response = PersonDBResponse;
    type Id = PersonId;
    type Filter = PersonFilter;

    /// Insert the person and cascade-save its new items in the same transaction.
    #[instrument(skip(self, request), fields(name = %request.name, items = request.items.len()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let person = sqlx::query_as::<_, PersonDBResponse>(&format!(
            "INSERT INTO person (name, age, email, date_of_birth, created_at, mood)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(request.age)
        .bind(&request.email)
        .bind(request.date_of_birth)
        .bind(request.created_at)
        .bind(request.mood)
        .fetch_one(&mut *tx)
        .await?;
        self.round_trips += 1;

        for item_name in &request.items {
            sqlx::query("INSERT INTO item (item_name, person_id) VALUES (?, ?)")
                .bind(item_name)
                .bind(person.id)
                .execute(&mut *tx)
                .await?;
            self.round_trips += 1;
        }

        tx.commit().await?;

        debug!(person_id = person.id, "person created");
        Ok(person)
    }

    /// Narrow read: the person row only.
    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let person = sqlx::query_as::<_, PersonDBResponse>(&format!("SELECT {PERSON_COLUMNS} FROM person WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(person)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<PersonId>) -> Result<HashMap<Self::Id, PersonDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {PERSON_COLUMNS} FROM person WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let people = query.build_query_as::<PersonDBResponse>().fetch_all(&mut *self.db).await?;
        self.round_trips += 1;

        Ok(people.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Narrow listing in id order. Items are not loaded; use [`People::list_with_items`] when
    /// the caller needs them.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let people = sqlx::query_as::<_, PersonDBResponse>(&format!(
            "SELECT {PERSON_COLUMNS} FROM person ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;
        self.round_trips += 1;

        Ok(people)
    }

    /// Owned items are detached by the `ON DELETE SET NULL` foreign key, never removed.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM person WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite name, age and email. Creation time, mood, date of birth and items are kept.
    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let person = sqlx::query_as::<_, PersonDBResponse>(&format!(
            "UPDATE person SET name = ?, age = ?, email = ?
             WHERE id = ?
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(request.age)
        .bind(&request.email)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound);
        self.round_trips += 1;

        person
    }
}

impl<'c> People<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db, round_trips: 0 }
    }

    /// Number of statements this repository has sent to the store
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    /// Every person with its items materialized, in a single statement.
    ///
    /// The outer join yields one row per (person, item) pair and one row for each person that
    /// owns nothing. Rows arrive ordered by person id, so consecutive rows of the same person are
    /// folded into one entry.
    #[instrument(skip(self), err)]
    pub async fn list_with_items(&mut self) -> Result<Vec<PersonWithItemsDBResponse>> {
        let people = self.joined(None).await?;
        debug!(people = people.len(), "loaded people with items");
        Ok(people)
    }

    /// One person with its items, in a single statement
    #[instrument(skip(self), err)]
    pub async fn get_with_items(&mut self, id: PersonId) -> Result<Option<PersonWithItemsDBResponse>> {
        Ok(self.joined(Some(id)).await?.pop())
    }

    async fn joined(&mut self, id: Option<PersonId>) -> Result<Vec<PersonWithItemsDBResponse>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT p.id AS id, p.name AS name, p.age AS age, p.email AS email,
                    p.date_of_birth AS date_of_birth, p.created_at AS created_at, p.mood AS mood,
                    i.id AS item_id, i.item_name AS item_name
             FROM person p
             LEFT OUTER JOIN item i ON i.person_id = p.id",
        );
        if let Some(id) = id {
            query.push(" WHERE p.id = ").push_bind(id);
        }
        query.push(" ORDER BY p.id, i.id");

        let rows = query.build_query_as::<PersonItemRow>().fetch_all(&mut *self.db).await?;
        self.round_trips += 1;

        let mut people: Vec<PersonWithItemsDBResponse> = Vec::new();
        for row in rows {
            let item = match (row.item_id, row.item_name) {
                (Some(id), Some(item_name)) => Some(ItemDBResponse {
                    id,
                    item_name,
                    owner_id: Some(row.person.id),
                }),
                _ => None,
            };

            match people.last_mut() {
                Some(last) if last.person.id == row.person.id => last.items.extend(item),
                _ => people.push(PersonWithItemsDBResponse {
                    person: row.person,
                    items: item.into_iter().collect(),
                }),
            }
        }

        Ok(people)
    }

    #[instrument(skip(self, name), err)]
    pub async fn find_by_name(&mut self, name: &str) -> Result<Vec<PersonDBResponse>> {
        let people = sqlx::query_as::<_, PersonDBResponse>(&format!("SELECT {PERSON_COLUMNS} FROM person WHERE name = ? ORDER BY id"))
            .bind(name)
            .fetch_all(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(people)
    }

    #[instrument(skip(self, name), err)]
    pub async fn find_by_name_ordered_by_age(&mut self, name: &str) -> Result<Vec<PersonDBResponse>> {
        let people = sqlx::query_as::<_, PersonDBResponse>(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE name = ? ORDER BY age, id"
        ))
        .bind(name)
        .fetch_all(&mut *self.db)
        .await?;
        self.round_trips += 1;

        Ok(people)
    }

    #[instrument(skip(self, email), err)]
    pub async fn find_by_email(&mut self, email: &str) -> Result<Vec<PersonDBResponse>> {
        let people = sqlx::query_as::<_, PersonDBResponse>(&format!("SELECT {PERSON_COLUMNS} FROM person WHERE email = ? ORDER BY id"))
            .bind(email)
            .fetch_all(&mut *self.db)
            .await?;
        self.round_trips += 1;

        Ok(people)
    }

    /// Case-sensitive prefix match on the name (SQLite `LIKE` would fold ASCII case).
    #[instrument(skip(self, prefix), err)]
    pub async fn find_by_name_prefix(&mut self, prefix: &str) -> Result<Vec<PersonDBResponse>> {
        let people = sqlx::query_as::<_, PersonDBResponse>(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE substr(name, 1, length(?)) = ? ORDER BY id"
        ))
        .bind(prefix)
        .bind(prefix)
        .fetch_all(&mut *self.db)
        .await?;
        self.round_trips += 1;

        Ok(people)
    }
}
