use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{ActingUser, UserRole};
use crate::error::AppError;

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Bearer token payload. Tokens are issued elsewhere; this crate only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub exp: usize,
}

impl Claims {
    pub fn acting_user(&self) -> ActingUser {
        ActingUser::new(self.sub, self.role)
    }

    /// Signs a token for `user_id`, valid for a day.
    pub fn issue(user_id: Uuid, role: UserRole, config: &Config) -> Result<String, AppError> {
        let expiration = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
        let claims = Claims {
            sub: user_id,
            role,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_ref()),
        )
        .map_err(|err| AppError::internal_server_error_message(format!("Token signing failed: {}", err)))
    }

    fn decode_bearer(req: &HttpRequest) -> Result<Self, AppError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let config = req.app_data::<Data<Config>>().ok_or_else(|| {
            AppError::internal_server_error_message("Configuration is not registered")
        })?;

        decode::<Claims>(
            token.trim(),
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            log::debug!("Rejected bearer token: {}", err);
            AppError::Unauthorized
        })
    }
}

impl FromRequest for Claims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::decode_bearer(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use pretty_assertions::assert_eq;

    #[actix_web::test]
    async fn issued_token_round_trips_through_the_extractor() {
        // Arrange
        let config = Config::test_config();
        let user_id = Uuid::new_v4();
        let token = Claims::issue(user_id, UserRole::Manager, &config).unwrap();
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .app_data(Data::new(config))
            .to_http_request();

        // Act
        let claims = Claims::extract(&req).await.unwrap();

        // Assert
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.acting_user().role, UserRole::Manager);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(Data::new(Config::test_config()))
            .to_http_request();

        let result = Claims::extract(&req).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[actix_web::test]
    async fn token_signed_with_another_secret_is_unauthorized() {
        let mut other = Config::test_config();
        other.jwt_secret = "a-completely-different-secret-value".to_string();
        let token = Claims::issue(Uuid::new_v4(), UserRole::Employee, &other).unwrap();
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .app_data(Data::new(Config::test_config()))
            .to_http_request();

        let result = Claims::extract(&req).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
