use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::{
    api::models::people::{Mood, PersonInput, PersonSearchQuery, PersonUpdate, SearchOrder},
    db::{
        errors::DbError,
        handlers::{People, PersonFilter, Repository},
        models::people::{PersonCreateDBRequest, PersonDBResponse, PersonUpdateDBRequest, PersonWithItemsDBResponse},
    },
    errors::{Error, Result},
    types::PersonId,
};

fn not_found(id: PersonId) -> Error {
    Error::NotFound {
        resource: "Person".to_string(),
        id: id.to_string(),
    }
}

/// Service for managing people and the items created alongside them
#[derive(Clone)]
pub struct PeopleService {
    db: SqlitePool,
}

impl PeopleService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Every person, without items
    #[instrument(skip(self), err)]
    pub async fn find_all(&self) -> Result<Vec<PersonDBResponse>> {
        let mut tx = self.db.begin().await?;
        let people = People::new(&mut tx).list(&PersonFilter::all()).await?;
        tx.commit().await?;

        Ok(people)
    }

    /// Every person with its items, loaded by one joined statement
    #[instrument(skip(self), err)]
    pub async fn find_all_with_items(&self) -> Result<Vec<PersonWithItemsDBResponse>> {
        let mut tx = self.db.begin().await?;
        let people = People::new(&mut tx).list_with_items().await?;
        tx.commit().await?;

        info!("Found {} people", people.len());
        Ok(people)
    }

    #[instrument(skip(self), err)]
    pub async fn find_one(&self, id: PersonId) -> Result<PersonDBResponse> {
        let mut tx = self.db.begin().await?;
        let person = People::new(&mut tx).get_by_id(id).await?;
        tx.commit().await?;

        person.ok_or_else(|| {
            warn!("Person not found: {id}");
            not_found(id)
        })
    }

    #[instrument(skip(self), err)]
    pub async fn find_one_with_items(&self, id: PersonId) -> Result<PersonWithItemsDBResponse> {
        let mut tx = self.db.begin().await?;
        let person = People::new(&mut tx).get_with_items(id).await?;
        tx.commit().await?;

        person.ok_or_else(|| {
            warn!("Person not found: {id}");
            not_found(id)
        })
    }

    /// Persist a new person with its items. The creation time and the starting mood are
    /// assigned here, never taken from the caller.
    #[instrument(skip(self, input), fields(name = %input.name), err)]
    pub async fn create(&self, input: PersonInput) -> Result<PersonDBResponse> {
        let request = PersonCreateDBRequest {
            name: input.name,
            age: input.age,
            email: input.email,
            date_of_birth: input.date_of_birth,
            created_at: Utc::now(),
            mood: Mood::Calm,
            items: input.items,
        };

        let mut tx = self.db.begin().await?;
        let person = People::new(&mut tx).create(&request).await?;
        tx.commit().await?;

        info!("Created person {} with ID: {}", person.name, person.id);
        Ok(person)
    }

    /// Overwrite name, age and email of the person with this id. Never inserts.
    #[instrument(skip(self, input), err)]
    pub async fn update(&self, id: PersonId, input: PersonUpdate) -> Result<PersonDBResponse> {
        let request = PersonUpdateDBRequest {
            name: input.name,
            age: input.age,
            email: input.email,
        };

        let mut tx = self.db.begin().await?;
        let person = match People::new(&mut tx).update(id, &request).await {
            Ok(person) => person,
            Err(DbError::NotFound) => {
                warn!("Update of unknown person: {id}");
                return Err(not_found(id));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        info!("Updated person {} with ID: {}", person.name, person.id);
        Ok(person)
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: PersonId) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let removed = People::new(&mut tx).delete(id).await?;
        if !removed {
            warn!("Delete of unknown person: {id}");
            return Err(not_found(id));
        }
        tx.commit().await?;

        info!("Deleted person with ID: {id}");
        Ok(())
    }

    /// Filtered listing. The first present criterion wins, in the order email, name, prefix.
    /// With no criterion this is the narrow listing.
    #[instrument(skip(self), err)]
    pub async fn search(&self, query: &PersonSearchQuery) -> Result<Vec<PersonDBResponse>> {
        let present = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        let mut tx = self.db.begin().await?;
        let mut repo = People::new(&mut tx);
        let people = if let Some(email) = present(&query.email) {
            repo.find_by_email(&email).await?
        } else if let Some(name) = present(&query.name) {
            match query.order {
                SearchOrder::Age => repo.find_by_name_ordered_by_age(&name).await?,
                SearchOrder::Id => repo.find_by_name(&name).await?,
            }
        } else if let Some(prefix) = present(&query.prefix) {
            repo.find_by_name_prefix(&prefix).await?
        } else {
            repo.list(&PersonFilter::all()).await?
        };
        tx.commit().await?;

        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{person_input, person_update};

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_stamps_time_and_default_mood(pool: SqlitePool) {
        let service = PeopleService::new(pool);
        let before = Utc::now();

        let person = service.create(person_input("Alice", 30, &["Book"])).await.unwrap();

        assert_eq!(person.mood, Mood::Calm);
        assert!(person.created_at >= before - chrono::Duration::seconds(1));
        assert!(person.created_at <= Utc::now());

        let loaded = service.find_one_with_items(person.id).await.unwrap();
        assert_eq!(loaded.items.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_find_all_is_narrow_and_eager_includes_items(pool: SqlitePool) {
        let service = PeopleService::new(pool);
        service.create(person_input("Alice", 30, &["Book", "Pen"])).await.unwrap();
        service.create(person_input("Bob", 31, &[])).await.unwrap();

        let narrow = service.find_all().await.unwrap();
        assert_eq!(narrow.len(), 2);

        let eager = service.find_all_with_items().await.unwrap();
        assert_eq!(eager.len(), 2);
        assert_eq!(eager[0].items.len(), 2);
        assert!(eager[1].items.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_uses_path_id(pool: SqlitePool) {
        let service = PeopleService::new(pool);
        let person = service.create(person_input("Carol", 40, &[])).await.unwrap();

        let updated = service.update(person.id, person_update("Caroline", 41)).await.unwrap();
        assert_eq!(updated.id, person.id);
        assert_eq!(updated.name, "Caroline");

        let all = service.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].age, 41);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_unknown_id_is_not_found_and_creates_nothing(pool: SqlitePool) {
        let service = PeopleService::new(pool);

        let result = service.update(99, person_update("Ghost", 1)).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(service.find_all().await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete(pool: SqlitePool) {
        let service = PeopleService::new(pool);
        let keep = service.create(person_input("Keep", 1, &[])).await.unwrap();
        let gone = service.create(person_input("Gone", 2, &[])).await.unwrap();

        service.delete(gone.id).await.unwrap();
        assert!(matches!(service.delete(gone.id).await, Err(Error::NotFound { .. })));
        assert!(matches!(service.find_one(gone.id).await, Err(Error::NotFound { .. })));

        let remaining = service.find_all().await.unwrap();
        assert_eq!(remaining, vec![keep]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_search_precedence(pool: SqlitePool) {
        let service = PeopleService::new(pool);
        service.create(person_input("Sam", 50, &[])).await.unwrap();
        service.create(person_input("Sam", 20, &[])).await.unwrap();
        service.create(person_input("Samantha", 30, &[])).await.unwrap();

        let by_age = service
            .search(&PersonSearchQuery {
                name: Some("Sam".to_string()),
                order: SearchOrder::Age,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_age.iter().map(|p| p.age).collect::<Vec<_>>(), vec![20, 50]);

        let by_prefix = service
            .search(&PersonSearchQuery {
                prefix: Some("Sam".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_prefix.len(), 3);

        // email beats name
        let by_email = service
            .search(&PersonSearchQuery {
                name: Some("Sam".to_string()),
                email: Some("samantha@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].name, "Samantha");

        // blank criteria fall through to the full listing
        let all = service
            .search(&PersonSearchQuery {
                name: Some("  ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }
}
