use std::sync::Arc;

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::repository::VolunteerRepository;
use crate::types::{AuthError, LoginRequest, RegisterRequest, Volunteer};

/// bcrypt cost used when none is configured
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// A service for registering volunteers and checking their credentials.
#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn VolunteerRepository>,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Creates a new instance of `AuthService` over the given store, hashing with the default bcrypt cost.
    pub fn new(repository: Arc<dyn VolunteerRepository>) -> Self {
        Self::with_cost(repository, DEFAULT_BCRYPT_COST)
    }

    /// Creates a new instance of `AuthService` hashing passwords with the given bcrypt cost.
    pub fn with_cost(repository: Arc<dyn VolunteerRepository>, bcrypt_cost: u32) -> Self {
        Self {
            repository,
            bcrypt_cost,
        }
    }

    /// Registers a new volunteer. Only the bcrypt hash of the password is stored.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Volunteer, AuthError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }

        if self.repository.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash(&request.password, self.bcrypt_cost)?;
        let volunteer = self.repository.insert(username, &password_hash).await?;

        log::info!("🙋 Volunteer {} registered", volunteer.username);
        Ok(volunteer)
    }

    /// Verifies a volunteer's credentials. Unknown usernames and wrong
    /// passwords fail the same way.
    pub async fn verify_password(&self, request: &LoginRequest) -> Result<Volunteer, AuthError> {
        let volunteer = self
            .repository
            .find_by_username(request.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify(&request.password, &volunteer.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(volunteer)
    }
}
