//! Token exchange pipeline and Data Cloud data shaping for `sfcdp`.
//!
//! - **[`Session`]** runs the strictly sequential pipeline for one
//!   invocation: sign a JWT assertion, trade it for a core token, trade
//!   that for a Data Cloud token, then expose metadata and query calls
//!   bound to the resulting bearer credential.
//!
//! - **[`metadata`]** flattens entity/field metadata into table rows with
//!   case-sensitive substring filtering.
//!
//! - **[`query`]** drives the paginated query loop as a lazy stream of
//!   [`QueryPage`]s, each carrying its columns in server-declared order
//!   (see [`columns`]).
//!
//! Nothing here caches or persists tokens; every session starts fresh.

pub mod columns;
pub mod config;
pub mod error;
pub mod metadata;
pub mod query;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use columns::{OrderedColumn, cell, ordered_columns};
pub use config::SessionConfig;
pub use error::CoreError;
pub use metadata::{EntityRow, FieldRow, Filters, MetadataRows, MetadataView, entity_type};
pub use query::{QUERY_PAGE_SIZE, QueryPage, QueryResult, QueryRunner};
pub use session::Session;

// Wire-level types consumers need without depending on sfcdp-api directly.
pub use sfcdp_api::{
    CoreToken, Credentials, DataCloudToken, EntityMetadata, FieldMetadata, TlsMode,
    TransportConfig, UpstreamBody, redact,
};
