// sfcdp-api: Async client for the Salesforce JWT bearer flow and the Data Cloud REST API

pub mod assertion;
pub mod data;
pub mod error;
pub mod oauth;
mod response;
pub mod transport;

pub use assertion::{
    ASSERTION_TTL_SECS, Assertion, AssertionClaims, Credentials, sign_assertion, sign_assertion_at,
};
pub use data::DataCloudClient;
pub use data::types::{
    ColumnMetadata, EntityMetadata, FieldMetadata, MetadataResponse, QueryRequest, QueryResponse,
};
pub use error::{Error, Failure, TokenHop, UpstreamBody};
pub use oauth::{CoreToken, DataCloudToken, TokenClient, redact, token_url_for};
pub use transport::{TlsMode, TransportConfig};
