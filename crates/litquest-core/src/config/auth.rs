//! Credential verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external credential-verification capability.
///
/// Token issuance is owned by the platform's auth service; this service
/// only verifies signatures and claims on inbound connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key shared with the token issuer (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Expected `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: default_issuer(),
            audience: default_audience(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "litquest-auth".to_string()
}

fn default_audience() -> String {
    "litquest-api".to_string()
}
