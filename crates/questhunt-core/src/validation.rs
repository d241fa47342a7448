//! Fire-and-forget "quest validated" notification.
//!
//! `POST {base_url}/api/quete/valider` with an empty body. The response is
//! logged and otherwise ignored: no retry, no confirmation state.

use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::error::ValidationError;
use crate::storage::ValidationConfig;

pub const VALIDATION_PATH: &str = "/api/quete/valider";

#[derive(Debug, Clone)]
pub struct ValidationClient {
    http: Client,
    endpoint: Url,
    timeout: Duration,
}

impl ValidationClient {
    pub fn new(config: &ValidationConfig) -> Result<Self, ValidationError> {
        let endpoint = Url::parse(&config.base_url)?.join(VALIDATION_PATH)?;
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Per-request timeout; also bounds how long a caller should wait on
    /// a submitted request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send the notification in the background.
    ///
    /// Dropping the returned handle does not cancel the request, but
    /// shutting the runtime down does: await it before tearing down.
    pub fn submit(&self, quest_id: u32) -> JoinHandle<()> {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            match http.post(endpoint.clone()).send().await {
                Ok(response) => {
                    debug!(quest_id, status = %response.status(), %endpoint, "validation sent")
                }
                Err(e) => warn!(quest_id, error = %e, %endpoint, "validation request failed"),
            }
        })
    }
}
