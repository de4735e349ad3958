mod methods;
mod models;

pub use models::*;

use reqwest::Client;
use tracing::debug;

use crate::error::BootstrapError;

/// Client for a portal's sharing API. Holds the resolved portal URL and any
/// registered OAuth application.
pub struct PortalClient {
    client: Client,
    portal_url: String,
    oauth: Option<OAuthInfo>,
}

impl PortalClient {
    pub fn new(portal_url: &str) -> Result<Self, BootstrapError> {
        let client = Client::builder().gzip(true).build()?;

        Ok(Self {
            client,
            portal_url: portal_url.trim_end_matches('/').to_string(),
            oauth: None,
        })
    }

    /// Register an OAuth application id with the identity layer.
    pub fn register_oauth(&mut self, info: OAuthInfo) {
        debug!("Registered OAuth application {}", info.app_id);
        self.oauth = Some(info);
    }

    pub async fn check_sign_in(&self) -> Result<bool, BootstrapError> {
        if let Some(oauth) = &self.oauth {
            debug!("Checking sign-in status for OAuth application {}", oauth.app_id);
        }
        methods::check_sign_in(&self.client, &self.portal_url).await
    }

    pub async fn fetch_item(&self, id: &str) -> Result<PortalItem, BootstrapError> {
        methods::fetch_item(&self.client, &self.portal_url, id).await
    }

    /// Load an application item together with its stored configuration
    /// values. Items that were never configured have no data payload; that is
    /// not an error.
    pub async fn fetch_application_item(&self, id: &str) -> Result<ApplicationItem, BootstrapError> {
        let item = methods::fetch_item(&self.client, &self.portal_url, id).await?;
        let values = match methods::fetch_item_data(&self.client, &self.portal_url, id).await {
            Ok(data) => data.values,
            Err(err) => {
                debug!("No configuration values for item {id}: {err}");
                None
            }
        };

        Ok(ApplicationItem { item, values })
    }

    pub async fn fetch_self(&self) -> Result<PortalSelf, BootstrapError> {
        methods::fetch_self(&self.client, &self.portal_url).await
    }

    pub async fn query_groups(&self, query: &str) -> Result<GroupQueryResult, BootstrapError> {
        methods::query_groups(&self.client, &self.portal_url, query).await
    }

    pub async fn query_items(
        &self,
        params: &PortalQueryParams,
    ) -> Result<ItemQueryResult, BootstrapError> {
        methods::query_items(&self.client, &self.portal_url, params).await
    }
}
