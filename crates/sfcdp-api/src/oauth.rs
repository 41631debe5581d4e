// OAuth token exchange
//
// Two sequential hops: the signed JWT assertion is traded for a core
// access token, which is then traded for a Data Cloud access token.
// Neither hop retries; any non-200 answer ends the invocation.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::assertion::Assertion;
use crate::error::{Error, Failure, TokenHop};
use crate::response;
use crate::transport::TransportConfig;

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const DATA_CLOUD_GRANT: &str = "urn:salesforce:grant-type:external:cdp";
pub const ACCESS_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";

const CORE_TOKEN_PATH: &str = "/services/oauth2/token";
const DATA_CLOUD_TOKEN_PATH: &str = "/services/a360/token";

// ── Token types ─────────────────────────────────────────────────────

/// Result of the first hop. Consumed immediately by the second.
#[derive(Debug, Clone)]
pub struct CoreToken {
    pub access_token: SecretString,
    /// Org instance, e.g. `https://mydomain.my.salesforce.com`.
    pub instance_url: Url,
    pub token_type: String,
    pub scope: String,
    /// Identity URL of the authenticated user.
    pub id: String,
}

/// Result of the second hop. Bearer credential for every Data Cloud call.
#[derive(Debug, Clone)]
pub struct DataCloudToken {
    pub access_token: SecretString,
    /// Tenant host, usually without a scheme (`abc123.c360a.salesforce.com`).
    pub instance_url: String,
    pub token_type: String,
    pub issued_token_type: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

impl DataCloudToken {
    /// Root URL for the Data Cloud REST API, always ending in `/`.
    ///
    /// The tenant endpoint comes back as a bare host and is served over
    /// HTTPS; a value that already carries a scheme is used as-is.
    pub fn base_url(&self) -> Result<Url, Error> {
        let raw = self.instance_url.trim().trim_end_matches('/');
        let full = if raw.contains("://") {
            format!("{raw}/")
        } else {
            format!("https://{raw}/")
        };
        Ok(Url::parse(&full)?)
    }
}

// Wire shapes. Secrets are moved into `SecretString` right after decoding.

#[derive(Deserialize)]
struct CoreTokenResponse {
    access_token: String,
    instance_url: Url,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    id: String,
}

impl From<CoreTokenResponse> for CoreToken {
    fn from(raw: CoreTokenResponse) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            instance_url: raw.instance_url,
            token_type: raw.token_type,
            scope: raw.scope,
            id: raw.id,
        }
    }
}

#[derive(Deserialize)]
struct DataCloudTokenResponse {
    access_token: String,
    instance_url: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    issued_token_type: String,
    #[serde(default)]
    expires_in: u64,
}

impl From<DataCloudTokenResponse> for DataCloudToken {
    fn from(raw: DataCloudTokenResponse) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            instance_url: raw.instance_url,
            token_type: raw.token_type,
            issued_token_type: raw.issued_token_type,
            expires_in: raw.expires_in,
        }
    }
}

// ── URL helpers ─────────────────────────────────────────────────────

/// `{login_url}/services/oauth2/token`
pub fn token_url_for(login_url: &Url) -> Result<Url, Error> {
    Ok(login_url.join(CORE_TOKEN_PATH)?)
}

fn data_cloud_token_url(instance_url: &Url) -> Result<Url, Error> {
    Ok(instance_url.join(DATA_CLOUD_TOKEN_PATH)?)
}

/// First `keep` characters of a secret followed by `...`, for display.
pub fn redact(secret: &SecretString, keep: usize) -> String {
    let prefix: String = secret.expose_secret().chars().take(keep).collect();
    format!("{prefix}...")
}

// ── Client ──────────────────────────────────────────────────────────

/// Performs the two OAuth hops. Holds no token state of its own.
pub struct TokenClient {
    http: reqwest::Client,
}

impl TokenClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Trade a signed assertion for a core access token.
    ///
    /// `POST {token_url}` with
    /// `grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=<jwt>`
    pub async fn exchange_core_token(
        &self,
        token_url: &Url,
        assertion: &Assertion,
    ) -> Result<CoreToken, Error> {
        debug!("exchanging JWT assertion at {token_url}");

        let form = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.expose()),
        ];
        let raw: CoreTokenResponse = self.post_form(TokenHop::Core, token_url, &form).await?;
        let token = CoreToken::from(raw);

        info!(instance_url = %token.instance_url, "authenticated with core API");
        Ok(token)
    }

    /// Trade a core access token for a Data Cloud access token.
    ///
    /// `POST {core.instance_url}/services/a360/token` with the
    /// token-exchange grant and the core token as `subject_token`.
    pub async fn exchange_data_cloud_token(&self, core: &CoreToken) -> Result<DataCloudToken, Error> {
        let url = data_cloud_token_url(&core.instance_url)?;
        debug!("exchanging core token at {url}");

        let form = [
            ("grant_type", DATA_CLOUD_GRANT),
            ("subject_token", core.access_token.expose_secret()),
            ("subject_token_type", ACCESS_TOKEN_TYPE),
        ];
        let raw: DataCloudTokenResponse = self.post_form(TokenHop::DataCloud, &url, &form).await?;
        let token = DataCloudToken::from(raw);

        info!(instance_url = %token.instance_url, "exchanged core token for Data Cloud token");
        Ok(token)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        hop: TokenHop,
        url: &Url,
        form: &[(&str, &str)],
    ) -> Result<T, Error> {
        let resp = self
            .http
            .post(url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| Error::TokenExchange {
                hop,
                failure: Failure::network(&e),
            })?;

        if resp.status() != StatusCode::OK {
            let failure = response::rejected(resp).await;
            debug!(%hop, %failure, "token exchange rejected");
            return Err(Error::TokenExchange { hop, failure });
        }

        let body = resp.text().await.map_err(|e| Error::TokenExchange {
            hop,
            failure: Failure::network(&e),
        })?;
        response::decode_sensitive(url.as_str(), &body)
    }
}
