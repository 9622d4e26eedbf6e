//! Shared fixtures for unit and HTTP tests.

use crate::{
    api::models::people::{Mood, PersonInput, PersonUpdate},
    config::{Config, PoolSettings},
    db::{
        handlers::{People, Repository},
        models::people::{PersonCreateDBRequest, PersonDBResponse},
    },
};
use axum_test::TestServer;
use chrono::Utc;
use sqlx::SqlitePool;

/// Email derived from the name, so lookups in tests stay predictable
pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase().replace(' ', "."))
}

pub fn person_request(name: &str, age: i32, items: &[&str]) -> PersonCreateDBRequest {
    PersonCreateDBRequest {
        name: name.to_string(),
        age,
        email: email_for(name),
        date_of_birth: None,
        created_at: Utc::now(),
        mood: Mood::Calm,
        items: items.iter().map(|i| i.to_string()).collect(),
    }
}

pub fn person_input(name: &str, age: i32, items: &[&str]) -> PersonInput {
    PersonInput {
        name: name.to_string(),
        age,
        email: email_for(name),
        date_of_birth: None,
        items: items.iter().map(|i| i.to_string()).collect(),
    }
}

pub fn person_update(name: &str, age: i32) -> PersonUpdate {
    PersonUpdate {
        name: name.to_string(),
        age,
        email: email_for(name),
    }
}

pub async fn create_test_person(pool: &SqlitePool, name: &str, items: &[&str]) -> PersonDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    People::new(&mut conn)
        .create(&person_request(name, 30, items))
        .await
        .expect("Failed to create test person")
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    config.database.pool = PoolSettings {
        max_connections: 2,
        ..Default::default()
    };
    config
}

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    crate::Application::new_with_pool(create_test_config(), pool).into_test_server()
}
