use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::types::{AuthError, Volunteer};

/// Storage for volunteer records. Usernames are unique.
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// Finds a volunteer by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Volunteer>, AuthError>;

    /// Stores a new volunteer; fails with `UsernameTaken` on a duplicate.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<Volunteer, AuthError>;
}

/// PostgreSQL-backed volunteer store.
pub struct PgVolunteerRepository {
    pool: PgPool,
}

impl PgVolunteerRepository {
    /// Creates a new instance of `PgVolunteerRepository` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VolunteerRepository for PgVolunteerRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Volunteer>, AuthError> {
        let volunteer = sqlx::query_as::<_, Volunteer>(
            "SELECT id, username, password_hash, created_at FROM volunteers WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(volunteer)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Volunteer, AuthError> {
        let result = sqlx::query_as::<_, Volunteer>(
            r#"
            INSERT INTO volunteers (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(volunteer) => Ok(volunteer),
            // Two registrations racing past the service's existence check
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory volunteer store.
#[derive(Debug, Default)]
pub struct InMemoryVolunteerRepository {
    volunteers: Mutex<Vec<Volunteer>>,
}

impl InMemoryVolunteerRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VolunteerRepository for InMemoryVolunteerRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Volunteer>, AuthError> {
        let volunteers = self.volunteers.lock().await;
        Ok(volunteers.iter().find(|v| v.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<Volunteer, AuthError> {
        let mut volunteers = self.volunteers.lock().await;

        if volunteers.iter().any(|v| v.username == username) {
            return Err(AuthError::UsernameTaken);
        }

        let volunteer = Volunteer {
            id: volunteers.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        volunteers.push(volunteer.clone());

        Ok(volunteer)
    }
}
