//! JWT token validation.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use litquest_core::config::AuthConfig;
use litquest_core::error::AppError;

use super::claims::Claims;

/// Validates access tokens presented on WebSocket upgrades and REST calls.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Expected issuer.
    issuer: String,
    /// Expected audience.
    audience: String,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew
        // iss/aud are compared against configuration after decoding.
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Expiration
    /// 3. Issuer and audience match configuration
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        let claims = token_data.claims;

        if claims.iss != self.issuer {
            return Err(AppError::authentication("Invalid token issuer"));
        }
        if claims.aud != self.audience {
            return Err(AppError::authentication("Invalid token audience"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use litquest_core::error::ErrorKind;
    use litquest_entity::user::UserRole;

    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: "litquest-auth".to_string(),
            audience: "litquest-api".to_string(),
        }
    }

    fn mint(config: &AuthConfig, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_claims(config: &AuthConfig) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            email: "hana@example.com".to_string(),
            role: UserRole::Student,
            tid: Uuid::new_v4(),
            iat: now,
            exp: now + 3600,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        }
    }

    #[test]
    fn test_decode_valid_token() {
        let config = test_config();
        let claims = valid_claims(&config);
        let token = mint(&config, &claims);

        let decoded = JwtDecoder::new(&config).decode(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.tid, claims.tid);
        assert_eq!(decoded.role, UserRole::Student);
    }

    #[test]
    fn test_rejects_expired_token() {
        let config = test_config();
        let mut claims = valid_claims(&config);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = mint(&config, &claims);

        let err = JwtDecoder::new(&config).decode(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let config = test_config();
        let claims = valid_claims(&config);
        let other = AuthConfig {
            jwt_secret: "other-secret".to_string(),
            ..test_config()
        };
        let token = mint(&other, &claims);

        let err = JwtDecoder::new(&config).decode(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_rejects_wrong_issuer() {
        let config = test_config();
        let mut claims = valid_claims(&config);
        claims.iss = "someone-else".to_string();
        let token = mint(&config, &claims);

        let err = JwtDecoder::new(&config).decode(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_rejects_garbage() {
        let config = test_config();
        let err = JwtDecoder::new(&config)
            .decode("not-a-token")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
