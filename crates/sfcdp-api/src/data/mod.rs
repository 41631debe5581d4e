// Data Cloud REST API: metadata and query endpoints.

pub mod client;
pub mod types;

pub use client::DataCloudClient;
