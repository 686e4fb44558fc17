use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::AppError;
use crate::models::auth::{AuthenticatedUser, Claims};

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "Invalid Authorization header format"))?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "JWT secret not configured"))?;

        decode_access_token(token, &secret.0)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// Validates a token issued by the auth service and extracts the caller.
pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedUser, anyhow::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    let claims = data.claims;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        role: claims.role,
    })
}

pub fn require_admin(user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(role: UserRole, exp_offset: i64, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "u-1".into(),
            role,
            iat: now as usize,
            exp: (now + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let user = decode_access_token(&token(UserRole::Admin, 600, "s3cret"), "s3cret").unwrap();
        assert_eq!(user.user_id, "u-1");
        assert!(require_admin(&user).is_ok());
    }

    #[test]
    fn test_student_is_not_admin() {
        let user = decode_access_token(&token(UserRole::Student, 600, "s3cret"), "s3cret").unwrap();
        assert!(matches!(require_admin(&user), Err(AppError::Forbidden)));
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        assert!(decode_access_token(&token(UserRole::Admin, 600, "a"), "b").is_err());
        assert!(decode_access_token(&token(UserRole::Admin, -3600, "a"), "a").is_err());
    }
}
