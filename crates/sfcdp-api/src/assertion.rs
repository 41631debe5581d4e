// JWT bearer assertion signing
//
// Builds the `{iss, prn, aud, exp}` claim set the Salesforce identity
// service expects and signs it with the connected app's RSA key.
// Assertions are single-use and expire three minutes after signing.

use std::path::Path;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Lifetime of a signed assertion, in seconds.
pub const ASSERTION_TTL_SECS: i64 = 180;

/// Identity used to sign the assertion. Never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Connected app consumer key.
    pub client_id: String,
    pub username: String,
    /// Identity service root (e.g. `https://login.salesforce.com`).
    pub login_url: Url,
    /// PEM-encoded RSA private key.
    pub private_key: SecretString,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        username: impl Into<String>,
        login_url: Url,
        private_key: SecretString,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            username: username.into(),
            login_url,
            private_key,
        }
    }

    /// Load the private key from a PEM file.
    pub fn from_key_file(
        client_id: impl Into<String>,
        username: impl Into<String>,
        login_url: Url,
        key_path: &Path,
    ) -> Result<Self, Error> {
        let pem = std::fs::read_to_string(key_path).map_err(|source| Error::KeyFile {
            path: key_path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(
            client_id,
            username,
            login_url,
            SecretString::from(pem),
        ))
    }

    /// The `aud` claim: the login URL without a trailing slash.
    pub fn audience(&self) -> String {
        self.login_url.as_str().trim_end_matches('/').to_owned()
    }
}

/// Claim set of a JWT bearer assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub prn: String,
    pub aud: String,
    /// Unix seconds.
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(credentials: &Credentials, issued_at: DateTime<Utc>) -> Self {
        Self {
            iss: credentials.client_id.clone(),
            prn: credentials.username.clone(),
            aud: credentials.audience(),
            exp: issued_at.timestamp() + ASSERTION_TTL_SECS,
        }
    }
}

/// A signed, single-use assertion.
#[derive(Debug)]
pub struct Assertion {
    token: SecretString,
    claims: AssertionClaims,
}

impl Assertion {
    /// The compact JWT, for the token request body only.
    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn claims(&self) -> &AssertionClaims {
        &self.claims
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.exp, 0)
    }

    /// The identity service rejects an assertion once `exp` has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.claims.exp
    }
}

/// Sign a fresh assertion valid for [`ASSERTION_TTL_SECS`] from now.
pub fn sign_assertion(credentials: &Credentials) -> Result<Assertion, Error> {
    sign_assertion_at(credentials, Utc::now())
}

/// Sign an assertion as if issued at `issued_at`.
pub fn sign_assertion_at(
    credentials: &Credentials,
    issued_at: DateTime<Utc>,
) -> Result<Assertion, Error> {
    let claims = AssertionClaims::new(credentials, issued_at);
    let key = EncodingKey::from_rsa_pem(credentials.private_key.expose_secret().as_bytes())?;
    let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;

    debug!(
        iss = %claims.iss,
        aud = %claims.aud,
        exp = claims.exp,
        "signed JWT bearer assertion"
    );

    Ok(Assertion {
        token: SecretString::from(token),
        claims,
    })
}
