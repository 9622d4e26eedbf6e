//! API request/response models for people.

use crate::api::models::items::ItemResponse;
use crate::db::models::people::{PersonDBResponse, PersonWithItemsDBResponse};
use crate::errors::Error;
use crate::types::PersonId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a person is feeling. Stored as its upper-case name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    #[default]
    Calm,
    Excited,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mood::Happy => "HAPPY",
            Mood::Sad => "SAD",
            Mood::Angry => "ANGRY",
            Mood::Calm => "CALM",
            Mood::Excited => "EXCITED",
        };
        f.write_str(s)
    }
}

/// Raw person form submission.
///
/// Every field arrives as text so that malformed numbers and dates become field-level
/// validation messages instead of request rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonForm {
    pub name: String,
    pub age: String,
    pub email: String,
    pub date_of_birth: String,
    /// Item names, one per line (creation form only)
    pub items: String,
}

impl From<&PersonDBResponse> for PersonForm {
    fn from(person: &PersonDBResponse) -> Self {
        Self {
            name: person.name.clone(),
            age: person.age.to_string(),
            email: person.email.clone(),
            date_of_birth: person
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            items: String::new(),
        }
    }
}

/// A person form that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct PersonInput {
    pub name: String,
    pub age: i32,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub items: Vec<String>,
}

/// The editable subset of a person that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct PersonUpdate {
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Sort order for person searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrder {
    #[default]
    Id,
    Age,
}

/// Query parameters for `/people/search`. The first present criterion wins, in the order
/// `email`, `name`, `prefix`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonSearchQuery {
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub email: Option<String>,
    pub order: SearchOrder,
}

/// Hidden `_method` field used by HTML forms to reach PATCH and DELETE routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOverride {
    Patch,
    Delete,
}

impl FromStr for MethodOverride {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(MethodOverride::Patch),
            "delete" => Ok(MethodOverride::Delete),
            "" => Err(Error::BadRequest {
                message: "Missing _method override".to_string(),
            }),
            other => Err(Error::BadRequest {
                message: format!("Unsupported _method override: {other}"),
            }),
        }
    }
}

/// Person as handed to templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonResponse {
    pub id: PersonId,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub mood: Mood,
    /// Owned items (only present when the read site fetched them)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemResponse>>,
}

impl From<PersonDBResponse> for PersonResponse {
    fn from(db: PersonDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            age: db.age,
            email: db.email,
            date_of_birth: db.date_of_birth,
            created_at: db.created_at,
            mood: db.mood,
            items: None,
        }
    }
}

impl From<PersonWithItemsDBResponse> for PersonResponse {
    fn from(db: PersonWithItemsDBResponse) -> Self {
        let items = db.items.into_iter().map(ItemResponse::from).collect();
        Self::from(db.person).with_items(items)
    }
}

impl PersonResponse {
    pub fn with_items(mut self, items: Vec<ItemResponse>) -> Self {
        self.items = Some(items);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_display_matches_stored_form() {
        assert_eq!(Mood::Calm.to_string(), "CALM");
        assert_eq!(Mood::default(), Mood::Calm);
        assert_eq!(serde_json::to_string(&Mood::Excited).unwrap(), "\"EXCITED\"");
    }

    #[test]
    fn test_form_prefill_from_person() {
        let person = PersonDBResponse {
            id: 3,
            name: "Anna".to_string(),
            age: 41,
            email: "anna@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 2, 29),
            created_at: Utc::now(),
            mood: Mood::Happy,
        };
        let form = PersonForm::from(&person);
        assert_eq!(form.name, "Anna");
        assert_eq!(form.age, "41");
        assert_eq!(form.date_of_birth, "1984-02-29");
        assert!(form.items.is_empty());
    }

    #[test]
    fn test_method_override_parse() {
        assert_eq!("patch".parse::<MethodOverride>().unwrap(), MethodOverride::Patch);
        assert_eq!("DELETE".parse::<MethodOverride>().unwrap(), MethodOverride::Delete);

        let err = "put".parse::<MethodOverride>().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!("".parse::<MethodOverride>().is_err());
    }
}
