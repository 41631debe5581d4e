// Data Cloud HTTP client
//
// Bearer-authorized wrapper around `reqwest::Client` for the tenant
// endpoint returned by the second token hop. Only HTTP 200 counts as
// success; any other status ends the run with the upstream body attached.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::debug;
use url::Url;

use super::types::{EntityMetadata, MetadataResponse, QueryRequest, QueryResponse};
use crate::error::{Error, Failure};
use crate::oauth::DataCloudToken;
use crate::response;
use crate::transport::TransportConfig;

const METADATA_PATH: &str = "api/v1/metadata/";
const QUERY_PATH: &str = "api/v1/query";

/// Async client for the Data Cloud REST API.
pub struct DataCloudClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DataCloudClient {
    /// Build from a Data Cloud token.
    ///
    /// Injects `Authorization: Bearer <token>` as a sensitive default header.
    pub fn new(token: &DataCloudToken, transport: &TransportConfig) -> Result<Self, Error> {
        let bearer = format!("Bearer {}", token.access_token.expose_secret());
        let mut value = HeaderValue::from_str(&bearer)
            .map_err(|e| Error::InvalidHeader(format!("Data Cloud access token: {e}")))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: token.base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// List every entity with its fields.
    ///
    /// `GET /api/v1/metadata/`
    pub async fn get_metadata(&self) -> Result<Vec<EntityMetadata>, Error> {
        let url = self.url(METADATA_PATH)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::MetadataFetch {
                failure: Failure::network(&e),
            })?;

        if resp.status() != StatusCode::OK {
            return Err(Error::MetadataFetch {
                failure: response::rejected(resp).await,
            });
        }

        let body = resp.text().await.map_err(|e| Error::MetadataFetch {
            failure: Failure::network(&e),
        })?;
        let parsed: MetadataResponse = response::decode(url.as_str(), body)?;
        debug!(entities = parsed.metadata.len(), "metadata received");
        Ok(parsed.metadata)
    }

    /// Fetch a single page of query results.
    ///
    /// `POST /api/v1/query` with `{sql, limit, offset}`
    pub async fn query_page(&self, request: &QueryRequest) -> Result<QueryResponse, Error> {
        let url = self.url(QUERY_PATH)?;
        let offset = request.offset;
        debug!(offset, limit = request.limit, "POST {url}");

        let resp = self
            .http
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::QueryFetch {
                offset,
                failure: Failure::network(&e),
            })?;

        if resp.status() != StatusCode::OK {
            return Err(Error::QueryFetch {
                offset,
                failure: response::rejected(resp).await,
            });
        }

        let body = resp.text().await.map_err(|e| Error::QueryFetch {
            offset,
            failure: Failure::network(&e),
        })?;
        let page: QueryResponse = response::decode(url.as_str(), body)?;
        debug!(offset, rows = page.data.len(), done = page.done, "query page received");
        Ok(page)
    }
}
