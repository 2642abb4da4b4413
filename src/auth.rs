use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::error::ApiError;
use crate::models::LoginResponse;

/// Token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks HS256 tokens for the configured admin account
#[derive(Clone)]
pub struct Authenticator {
    required: bool,
    admin_username: String,
    admin_password: String,
    jwt_secret: String,
    token_ttl_secs: i64,
}

impl Authenticator {
    pub fn new(
        required: bool,
        admin_username: &str,
        admin_password: &str,
        jwt_secret: &str,
        token_ttl_secs: i64,
    ) -> Self {
        Self {
            required,
            admin_username: admin_username.to_string(),
            admin_password: admin_password.to_string(),
            jwt_secret: jwt_secret.to_string(),
            token_ttl_secs,
        }
    }

    /// Whether mutating endpoints reject requests without a token
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        if username != self.admin_username || password != self.admin_password {
            tracing::warn!("Failed login attempt for {}", username);
            return Err(ApiError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))?;

        tracing::info!("Issued token for {}", username);
        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl_secs,
            username: claims.sub,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::info!("Rejected token: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

/// Caller identity taken from `Authorization: Bearer <token>`
///
/// Without a header the extractor yields an anonymous caller unless the
/// authenticator requires tokens. A header that fails verification is
/// always rejected.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Option<Claims>,
}

impl AuthUser {
    pub fn username(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }

    fn extract(req: &HttpRequest) -> Result<Self, ApiError> {
        let authenticator = req
            .app_data::<web::Data<Authenticator>>()
            .ok_or_else(|| ApiError::Internal("Authenticator is not configured".to_string()))?;

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match token {
            Some(token) => Ok(Self {
                claims: Some(authenticator.verify(token)?),
            }),
            None if authenticator.is_required() => {
                Err(ApiError::Unauthorized("Missing bearer token".to_string()))
            }
            None => Ok(Self { claims: None }),
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_authenticator(required: bool) -> Authenticator {
        Authenticator::new(required, "admin", "secret", "test-signing-key", 3600)
    }

    #[test]
    fn test_login_and_verify_round_trip() {
        let auth = create_test_authenticator(false);
        let response = auth.login("admin", "secret").unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        let claims = auth.verify(&response.token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let auth = create_test_authenticator(false);
        assert!(matches!(
            auth.login("admin", "nope"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let issuer = Authenticator::new(false, "admin", "secret", "another-key", 3600);
        let token = issuer.login("admin", "secret").unwrap().token;
        assert!(create_test_authenticator(false).verify(&token).is_err());
    }

    #[test]
    fn test_extractor_modes() {
        let open = actix_web::test::TestRequest::default()
            .app_data(web::Data::new(create_test_authenticator(false)))
            .to_http_request();
        assert!(AuthUser::extract(&open).unwrap().claims.is_none());

        let closed = actix_web::test::TestRequest::default()
            .app_data(web::Data::new(create_test_authenticator(true)))
            .to_http_request();
        assert!(matches!(AuthUser::extract(&closed), Err(ApiError::Unauthorized(_))));

        let auth = create_test_authenticator(true);
        let token = auth.login("admin", "secret").unwrap().token;
        let bearer = actix_web::test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .app_data(web::Data::new(auth))
            .to_http_request();
        assert_eq!(AuthUser::extract(&bearer).unwrap().username(), Some("admin"));
    }
}
