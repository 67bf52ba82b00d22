use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::Callsign, protocol::checkname_path};

use crate::AvailabilityChecker;

/// Asks the server whether a callsign is free with a single `GET`.
///
/// No retries and no timeout beyond what the client was built with.
#[derive(Debug, Clone)]
pub struct HttpAvailabilityChecker {
    http: Client,
    server_url: String,
}

impl HttpAvailabilityChecker {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn endpoint(&self, callsign: &Callsign) -> String {
        format!("{}{}", self.server_url, checkname_path(callsign))
    }
}

#[async_trait]
impl AvailabilityChecker for HttpAvailabilityChecker {
    async fn check(&self, callsign: &Callsign) -> Result<u16> {
        let url = self.endpoint(callsign);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("availability request to '{url}' failed"))?;
        Ok(response.status().as_u16())
    }
}
