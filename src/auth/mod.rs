pub mod lifetime;
pub mod password;

use std::collections::HashSet;
use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use lifetime::parse_lifetime;
pub use password::{PasswordError, PasswordHasher};

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Session token of the user the JWT was issued to.
    pub token: String,
    /// Client address the token is pinned to.
    pub ip: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Whether `exp` was set at issuance.
    #[serde(default)]
    pub expire: bool,
}

impl Claims {
    pub fn new(token: impl Into<String>, ip: impl Into<String>, lifetime: Option<Duration>) -> Self {
        let now = Utc::now();
        let exp = lifetime.map(|d| (now + d).timestamp());

        Self {
            token: token.into(),
            ip: ip.into(),
            iat: now.timestamp(),
            exp,
            expire: exp.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Invalid {kind} key material: {reason}")]
    InvalidKey { kind: &'static str, reason: String },

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_pem(kind: TokenKind, private_pem: &[u8], public_pem: &[u8]) -> Result<Self, JwtError> {
        let invalid = |e: jsonwebtoken::errors::Error| JwtError::InvalidKey {
            kind: kind.as_str(),
            reason: e.to_string(),
        };

        Ok(Self {
            encoding: EncodingKey::from_rsa_pem(private_pem).map_err(invalid)?,
            decoding: DecodingKey::from_rsa_pem(public_pem).map_err(invalid)?,
        })
    }
}

/// RS256 key material for the access and refresh token families.
pub struct TokenKeys {
    access: KeyPair,
    refresh: KeyPair,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub fn from_pem(
        access_private: &[u8],
        access_public: &[u8],
        refresh_private: &[u8],
        refresh_public: &[u8],
    ) -> Result<Self, JwtError> {
        Ok(Self {
            access: KeyPair::from_pem(TokenKind::Access, access_private, access_public)?,
            refresh: KeyPair::from_pem(TokenKind::Refresh, refresh_private, refresh_public)?,
        })
    }

    /// Builds the keys from configuration, where each PEM document is base64 encoded.
    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        let decode_pem = |kind: TokenKind, value: &str| {
            BASE64.decode(value.trim()).map_err(|e| JwtError::InvalidKey {
                kind: kind.as_str(),
                reason: format!("base64: {}", e),
            })
        };

        Self::from_pem(
            &decode_pem(TokenKind::Access, &security.access_token_private)?,
            &decode_pem(TokenKind::Access, &security.access_token_public)?,
            &decode_pem(TokenKind::Refresh, &security.refresh_token_private)?,
            &decode_pem(TokenKind::Refresh, &security.refresh_token_public)?,
        )
    }

    fn pair(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn sign(&self, kind: TokenKind, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::RS256), claims, &self.pair(kind).encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Checks signature and algorithm, and `exp` only when the token carries one.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        decode::<Claims>(token, &self.pair(kind).decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

/// Lifetimes applied when a session asks for expiring tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenLifetimes {
    pub access: Option<Duration>,
    pub refresh: Option<Duration>,
}

impl TokenLifetimes {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            access: parse_lifetime(&security.access_token_expire),
            refresh: parse_lifetime(&security.refresh_token_expire),
        }
    }

    /// Lifetimes for a session: configured ones when `expire` is set, none otherwise.
    pub fn for_session(&self, expire: bool) -> Self {
        if expire {
            *self
        } else {
            Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_PRIVATE: &str = include_str!("../../tests/fixtures/access_private.pem");
    const ACCESS_PUBLIC: &str = include_str!("../../tests/fixtures/access_public.pem");
    const REFRESH_PRIVATE: &str = include_str!("../../tests/fixtures/refresh_private.pem");
    const REFRESH_PUBLIC: &str = include_str!("../../tests/fixtures/refresh_public.pem");

    fn keys() -> TokenKeys {
        TokenKeys::from_pem(
            ACCESS_PRIVATE.as_bytes(),
            ACCESS_PUBLIC.as_bytes(),
            REFRESH_PRIVATE.as_bytes(),
            REFRESH_PUBLIC.as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn expiring_claims_carry_exp() {
        let claims = Claims::new("tok", "127.0.0.1", Some(Duration::minutes(5)));
        assert!(claims.expire);
        assert_eq!(claims.exp, Some(claims.iat + 300));

        let claims = Claims::new("tok", "127.0.0.1", None);
        assert!(!claims.expire);
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn sign_and_verify_with_matching_family() {
        let keys = keys();
        let claims = Claims::new("session-token", "10.0.0.1", Some(Duration::minutes(1)));
        let jwt = keys.sign(TokenKind::Access, &claims).unwrap();
        assert_eq!(keys.verify(TokenKind::Access, &jwt).unwrap(), claims);
    }

    #[test]
    fn tokens_are_not_interchangeable_between_families() {
        let keys = keys();
        let claims = Claims::new("session-token", "10.0.0.1", None);
        let jwt = keys.sign(TokenKind::Refresh, &claims).unwrap();
        assert!(matches!(keys.verify(TokenKind::Access, &jwt), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn tokens_without_exp_are_accepted() {
        let keys = keys();
        let claims = Claims::new("session-token", "10.0.0.1", None);
        let jwt = keys.sign(TokenKind::Access, &claims).unwrap();
        let verified = keys.verify(TokenKind::Access, &jwt).unwrap();
        assert!(!verified.expire);
    }

    #[test]
    fn expired_tokens_are_reported_as_such() {
        let keys = keys();
        let mut claims = Claims::new("session-token", "10.0.0.1", Some(Duration::minutes(1)));
        claims.exp = Some(Utc::now().timestamp() - 120);
        let jwt = keys.sign(TokenKind::Access, &claims).unwrap();
        assert!(matches!(keys.verify(TokenKind::Access, &jwt), Err(JwtError::Expired)));
    }

    #[test]
    fn keys_load_from_base64_configuration() {
        let security = SecurityConfig {
            access_token_private: BASE64.encode(ACCESS_PRIVATE),
            access_token_public: BASE64.encode(ACCESS_PUBLIC),
            refresh_token_private: BASE64.encode(REFRESH_PRIVATE),
            refresh_token_public: BASE64.encode(REFRESH_PUBLIC),
            ..SecurityConfig::default()
        };
        assert!(TokenKeys::from_config(&security).is_ok());

        let broken = SecurityConfig {
            access_token_private: "not base64!".to_string(),
            ..security
        };
        assert!(matches!(
            TokenKeys::from_config(&broken),
            Err(JwtError::InvalidKey { kind: "access", .. })
        ));
    }

    #[test]
    fn session_lifetimes_follow_expire_flag() {
        let lifetimes = TokenLifetimes {
            access: Some(Duration::minutes(15)),
            refresh: Some(Duration::days(1)),
        };
        assert_eq!(lifetimes.for_session(true).access, Some(Duration::minutes(15)));
        assert!(lifetimes.for_session(false).access.is_none());
        assert!(lifetimes.for_session(false).refresh.is_none());
    }
}
