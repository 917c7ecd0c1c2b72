/// Signed bearer-token encoding and decoding
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims. Verification and reset tokens reuse the access encoder, so
/// their claims also say `access`; the ledger carries their semantic kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub exp: i64,
}

impl Claims {
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Encodes and decodes signed, expiring bearer tokens with a process-wide
/// secret and algorithm loaded once at startup.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    validation: Validation,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str, algorithm: &str) -> Result<Self, AuthError> {
        let algorithm: Algorithm = algorithm
            .parse()
            .map_err(|_| AuthError::InvalidInput(format!("unknown JWT algorithm: {algorithm}")))?;
        Ok(Self {
            header: Header::new(algorithm),
            validation: Validation::new(algorithm),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn issue(
        &self,
        user_id: i64,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::DependencyUnavailable(format!("token encoding failed: {e}")))
    }

    /// Decode and validate a token. Fails closed: signature mismatch,
    /// malformed payload, and expired `exp` all yield `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .ok()
    }
}
