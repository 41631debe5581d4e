// ── Runtime session configuration ──
//
// Describes *how* to authenticate and reach the API for one invocation.
// The CLI builds a `SessionConfig` and hands it in; core never reads
// config files.

use sfcdp_api::{Credentials, TransportConfig};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

impl SessionConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            transport: TransportConfig::default(),
        }
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}
