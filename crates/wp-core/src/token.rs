//! # Token Verifier
//!
//! Issues and verifies the signed bearer tokens handed out at sign-in.
//! Credentials travel in the `authentication` header as `"<scheme> <token>"`;
//! only the part after the first space is the signed token.

use crate::error::{AppError, AppResult};
use crate::user::{Role, UserProfile};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Header carrying the bearer credential
pub const CREDENTIAL_HEADER: &str = "authentication";

/// Default validity window of an issued token
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 720;

/// Registered claim names that a profile must not shadow
const RESERVED_CLAIMS: &[&str] = &["email", "role", "iat", "exp", "nbf", "aud", "iss", "sub", "jti"];

/// Claims carried by a verified token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Profile fields submitted at sign-in
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Signs and verifies tokens with a shared HMAC secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish()
    }
}

impl TokenService {
    pub fn new(secret: &str) -> AppResult<Self> {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::Configuration(
                "token signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Issue a token for `email` carrying its role and profile
    pub fn issue(&self, email: &str, role: Option<Role>, profile: &UserProfile) -> AppResult<String> {
        let now = Utc::now();
        let mut profile = profile.clone();
        profile.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        let claims = Claims {
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            profile,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a signed token: signature and expiry.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Forbidden("token expired".to_string()),
                _ => AppError::Forbidden("invalid token".to_string()),
            })
    }

    /// Verify the raw value of the credential header.
    ///
    /// `None` means no credential was presented and yields `Unauthenticated`;
    /// anything presented that fails verification yields `Forbidden`.
    pub fn verify(&self, credential: Option<&str>) -> AppResult<Claims> {
        let credential = credential
            .ok_or_else(|| AppError::Unauthenticated("no credential presented".to_string()))?;
        let token = bearer_token(credential)?;
        self.verify_token(token)
    }
}

/// Extract the token part of `"<scheme> <token>"`
pub fn bearer_token(credential: &str) -> AppResult<&str> {
    match credential.split_once(' ') {
        Some((_, token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::Forbidden("malformed credential".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new("test-secret").unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let profile = json!({"name": "Ada"}).as_object().cloned().unwrap();
        let token = service().issue("ada@example.com", None, &profile).unwrap();
        let claims = service().verify(Some(&format!("Bearer {token}"))).unwrap();

        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.profile["name"], "Ada");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_missing_credential_is_unauthenticated() {
        let err = service().verify(None).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_bad_credentials_are_forbidden() {
        let token = service().issue("ada@example.com", None, &UserProfile::new()).unwrap();
        let other = TokenService::new("other-secret").unwrap();

        for credential in [
            "Bearer".to_string(),
            "Bearer ".to_string(),
            "Bearer not.a.token".to_string(),
            format!("Bearer {token}x"),
        ] {
            let err = service().verify(Some(&credential)).unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)), "{credential}");
        }
        assert!(matches!(
            other.verify(Some(&format!("Bearer {token}"))),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_expired_token_is_forbidden() {
        let expired = TokenService::with_ttl("test-secret", Duration::hours(-2)).unwrap();
        let token = expired.issue("ada@example.com", None, &UserProfile::new()).unwrap();
        let err = service().verify_token(&token).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden access: token expired");
    }

    #[test]
    fn test_profile_cannot_shadow_claims() {
        let profile = json!({"exp": 1, "aud": "x", "email": "evil@example.com", "city": "Oslo"})
            .as_object()
            .cloned()
            .unwrap();
        let token = service().issue("ada@example.com", Some(Role::Admin), &profile).unwrap();
        let claims = service().verify_token(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, Some(Role::Admin));
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(claims.profile.len(), 1);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(TokenService::new(""), Err(AppError::Configuration(_))));
    }
}
