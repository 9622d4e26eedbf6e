//! Database models for people.

use crate::api::models::people::Mood;
use crate::db::models::items::ItemDBResponse;
use crate::types::PersonId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Database request for creating a new person.
///
/// `items` are item names saved in the same transaction and owned by the new row.
#[derive(Debug, Clone)]
pub struct PersonCreateDBRequest {
    pub name: String,
    pub age: i32,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub mood: Mood,
    pub items: Vec<String>,
}

/// Database request for replacing the mutable fields of a person
#[derive(Debug, Clone)]
pub struct PersonUpdateDBRequest {
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Database response for a person, without related items
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PersonDBResponse {
    pub id: PersonId,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub mood: Mood,
}

// Rows are the same entity exactly when their ids match.
impl PartialEq for PersonDBResponse {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PersonDBResponse {}

impl Hash for PersonDBResponse {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A person together with every item it owns, as produced by the joined fetch
#[derive(Debug, Clone, Serialize)]
pub struct PersonWithItemsDBResponse {
    #[serde(flatten)]
    pub person: PersonDBResponse,
    pub items: Vec<ItemDBResponse>,
}
