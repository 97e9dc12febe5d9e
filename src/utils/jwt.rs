use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

/// Token payload. `role` is what the route guards branch on: guests book
/// and browse, service providers manage places and the pending queue.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn issue(user_id: Uuid, email: &str, role: UserRole, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.to_string(),
            role,
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign an HS256 token on registration and login.
pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::issue(user_id, email, role, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

/// Decode and validate a bearer token. Expiry is enforced by `Validation`;
/// everything else the middleware needs rides in the claims themselves.
pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trips_subject_and_role() {
        let user_id = Uuid::new_v4();
        let token = create_token(
            user_id,
            "pier@example.com",
            UserRole::ServiceProvider,
            "test-secret",
            1,
        )
        .unwrap();

        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "pier@example.com");
        assert_eq!(claims.role, UserRole::ServiceProvider);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(
            Uuid::new_v4(),
            "guest@example.com",
            UserRole::Guest,
            "secret-a",
            1,
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, "secret-b"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
