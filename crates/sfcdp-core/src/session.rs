// ── Authenticated session ──
//
// A `Session` is the product of the full token pipeline. Construction is
// the only way to get one, so every Data Cloud call is guaranteed to run
// after both exchanges succeeded.

use futures_core::Stream;
use secrecy::SecretString;
use sfcdp_api::{
    CoreToken, DataCloudClient, DataCloudToken, EntityMetadata, TokenClient, sign_assertion,
    token_url_for,
};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::query::{QueryPage, QueryRunner};

pub struct Session {
    core: CoreToken,
    data_cloud: DataCloudToken,
    client: DataCloudClient,
}

impl Session {
    /// Sign, exchange for a core token, then exchange for a Data Cloud
    /// token. Each step starts only after the previous one succeeded.
    pub async fn connect(config: &SessionConfig) -> Result<Self, CoreError> {
        let credentials = &config.credentials;

        let assertion = sign_assertion(credentials)?;
        debug!(
            iss = %credentials.client_id,
            prn = %credentials.username,
            aud = %assertion.claims().aud,
            "signed JWT assertion"
        );

        let tokens = TokenClient::new(&config.transport)?;
        let token_url = token_url_for(&credentials.login_url)?;
        let core = tokens.exchange_core_token(&token_url, &assertion).await?;
        let data_cloud = tokens.exchange_data_cloud_token(&core).await?;
        let client = DataCloudClient::new(&data_cloud, &config.transport)?;

        info!(base_url = %client.base_url(), "Data Cloud session ready");
        Ok(Self {
            core,
            data_cloud,
            client,
        })
    }

    pub fn core_token(&self) -> &CoreToken {
        &self.core
    }

    pub fn data_cloud_token(&self) -> &DataCloudToken {
        &self.data_cloud
    }

    /// Bearer credential for Data Cloud calls.
    pub fn access_token(&self) -> &SecretString {
        &self.data_cloud.access_token
    }

    pub fn client(&self) -> &DataCloudClient {
        &self.client
    }

    /// Every entity the tenant exposes, with its fields.
    pub async fn fetch_metadata(&self) -> Result<Vec<EntityMetadata>, CoreError> {
        let entities = self.client.get_metadata().await?;
        debug!(entities = entities.len(), "fetched metadata");
        Ok(entities)
    }

    /// Run `sql` as a paginated query. See [`QueryRunner::into_stream`].
    pub fn run_query(
        &self,
        sql: String,
    ) -> impl Stream<Item = Result<QueryPage, CoreError>> + '_ {
        QueryRunner::new(&self.client, sql).into_stream()
    }
}
