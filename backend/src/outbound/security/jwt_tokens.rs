//! JWT implementation of the token-signing port.
//!
//! HS256 with the process-wide signing key; the subject claim carries
//! the user id and tokens expire after seven days.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::ports::{TokenError, TokenService};

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtTokenService {
    /// Create a service with the seven-day token lifetime.
    pub fn new(signing_key: &[u8]) -> Self {
        Self::with_lifetime(signing_key, Duration::days(TOKEN_LIFETIME_DAYS))
    }

    /// Create a service with an explicit lifetime. Exposed for expiry
    /// tests; production wiring uses [`JwtTokenService::new`].
    pub fn with_lifetime(signing_key: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(signing_key),
            decoding: DecodingKey::from_secret(signing_key),
            lifetime,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| TokenError::issuance(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| TokenError::Invalid)?;
        UserId::new(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    const KEY: &[u8] = b"test-signing-key";

    #[rstest]
    fn tokens_round_trip_their_user_id() {
        let service = JwtTokenService::new(KEY);
        let user = UserId::generate();

        let token = service.issue(&user).expect("issuance succeeds");
        let verified = service.verify(&token).expect("fresh token verifies");
        assert_eq!(verified, user);
    }

    #[rstest]
    fn foreign_signatures_are_rejected() {
        let issuer = JwtTokenService::new(b"some-other-key");
        let verifier = JwtTokenService::new(KEY);
        let token = issuer.issue(&UserId::generate()).expect("issuance succeeds");

        assert_eq!(verifier.verify(&token), Err(TokenError::Invalid));
    }

    #[rstest]
    fn expired_tokens_are_rejected() {
        // Negative lifetime puts the expiry beyond the default leeway.
        let service = JwtTokenService::with_lifetime(KEY, Duration::minutes(-5));
        let token = service.issue(&UserId::generate()).expect("issuance succeeds");

        assert_eq!(service.verify(&token), Err(TokenError::Invalid));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("aaaa.bbbb.cccc")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        let service = JwtTokenService::new(KEY);
        assert_eq!(service.verify(token), Err(TokenError::Invalid));
    }
}
