//! Client for the Realtime API.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::*;
use crate::websocket::WebSocketSession;

/// Default WebSocket endpoint.
pub const DEFAULT_WEBSOCKET_URL: &str = "wss://api.openai.com/v1/realtime";

/// Realtime API client.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub(crate) struct ClientConfig {
    pub api_key: String,
    pub organization: Option<String>,
    pub ws_url: String,
}

impl Client {
    /// Creates a new client with the default endpoint.
    ///
    /// Fails with [`Error::InvalidConfig`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// Returns a builder for a client with non-default options.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Establishes a WebSocket connection to the Realtime API.
    pub async fn connect_websocket(
        &self,
        config: Option<&ConnectConfig>,
    ) -> Result<WebSocketSession> {
        let model = config
            .map(|c| c.model.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_MODEL);

        WebSocketSession::connect(self.config.clone(), model).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("ws_url", &self.config.ws_url)
            .field("organization", &self.config.organization)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a Client with options.
pub struct ClientBuilder {
    api_key: String,
    organization: Option<String>,
    ws_url: Option<String>,
}

impl ClientBuilder {
    /// Creates a new client builder.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
            ws_url: None,
        }
    }

    /// Sets the organization ID.
    pub fn organization(mut self, org_id: impl Into<String>) -> Self {
        self.organization = Some(org_id.into());
        self
    }

    /// Sets the WebSocket URL.
    pub fn websocket_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("API key is required".to_string()));
        }
        let ws_url = self.ws_url.unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());
        if !ws_url.starts_with("wss://") && !ws_url.starts_with("ws://") {
            return Err(Error::InvalidConfig(format!("not a websocket url: {}", ws_url)));
        }

        Ok(Client {
            config: Arc::new(ClientConfig {
                api_key: self.api_key,
                organization: self.organization,
                ws_url,
            }),
        })
    }
}
