use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::types::{AuthError, Claims, Volunteer, VolunteerId};

/// Access tokens stay valid for one hour
const ACCESS_TOKEN_TTL_HOURS: i64 = 1;

/// Issues and verifies HS256 access tokens for volunteers.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a new `JwtService` signing with the given secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Generates an access token for the volunteer.
    pub fn generate_access_token(&self, volunteer: &Volunteer) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(ACCESS_TOKEN_TTL_HOURS);

        let claims = Claims {
            sub: volunteer.id.to_string(),
            username: volunteer.username.clone(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies the token signature and expiry, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies the token and returns the volunteer ID it was issued for.
    pub fn extract_volunteer_id_from_token(&self, token: &str) -> Result<VolunteerId, AuthError> {
        let claims = self.verify_token(token)?;
        let volunteer_id = claims.sub.parse::<VolunteerId>().map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;

        Ok(volunteer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volunteer() -> Volunteer {
        Volunteer {
            id: 7,
            username: "marie".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_carries_volunteer_identity() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_access_token(&volunteer()).unwrap();

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "marie");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(jwt.extract_volunteer_id_from_token(&token).unwrap(), 7);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = JwtService::new("one")
            .generate_access_token(&volunteer())
            .unwrap();

        assert!(matches!(
            JwtService::new("two").verify_token(&token),
            Err(AuthError::Jwt(_))
        ));
        assert!(JwtService::new("one").verify_token("garbage").is_err());
    }
}
