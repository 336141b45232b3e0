//! HS256 bearer tokens. Subject is the user's email; the numeric account id
//! rides along as a custom claim so handlers never need a user lookup to
//! authenticate.

use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error as JwtError,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_secs: i64,
}

impl JwtProvider {
    /// `secret` is the base64-encoded HMAC key shared with other services.
    pub fn new(secret: &SecretString, expiry_secs: i64) -> Result<Self, JwtError> {
        Ok(Self {
            encoding: EncodingKey::from_base64_secret(secret.expose_secret())?,
            decoding: DecodingKey::from_base64_secret(secret.expose_secret())?,
            expiry_secs,
        })
    }

    pub fn generate(&self, email: &str, user_id: i64) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            user_id,
            iat: now,
            exp: now + self.expiry_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verifies the signature and expiry, returning the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}
