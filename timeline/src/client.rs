//! Minimal XRPC client for a Bluesky PDS.

use std::time::Duration;

use reqwest::{header, Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::atproto::*;
use crate::error::{Result, TimelineError};

/// Default PDS entryway.
pub const DEFAULT_SERVICE: &str = "https://bsky.social";

/// Authenticated session tokens.
#[derive(Clone)]
pub struct AuthSession {
    pub did: String,
    pub handle: String,
    access_jwt: String,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// XRPC client for login and timeline fetches.
pub struct XrpcClient {
    client: ReqwestClient,
    service: String,
}

impl XrpcClient {
    /// Creates a client for `service` (e.g. `https://bsky.social`).
    pub fn new(service: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("skytalk/0.1")
            .build()?;
        Ok(Self {
            client,
            service: service.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }

    /// Logs in with a handle and app password.
    pub async fn create_session(&self, identifier: &str, password: &str) -> Result<AuthSession> {
        let response = self
            .client
            .post(self.url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST {
            let body = parse_error_body(response).await;
            return Err(TimelineError::Auth(if body.message.is_empty() {
                body.error
            } else {
                body.message
            }));
        }

        let session: CreateSessionResponse = handle_response(response).await?;
        debug!(did = %session.did, handle = %session.handle, "logged in");
        Ok(AuthSession {
            did: session.did,
            handle: session.handle,
            access_jwt: session.access_jwt,
        })
    }

    /// Fetches the reverse-chronological home timeline.
    pub async fn get_timeline(&self, auth: &AuthSession, limit: u32) -> Result<Vec<FeedViewPost>> {
        let response = self
            .client
            .get(self.url("app.bsky.feed.getTimeline"))
            .query(&[
                ("algorithm", "reverse-chronological".to_string()),
                ("limit", limit.clamp(1, 100).to_string()),
            ])
            .header(header::AUTHORIZATION, format!("Bearer {}", auth.access_jwt))
            .send()
            .await?;

        let timeline: GetTimelineResponse = handle_response(response).await?;
        debug!(posts = timeline.feed.len(), "timeline fetched");
        Ok(timeline.feed)
    }
}

async fn handle_response<R: DeserializeOwned>(response: Response) -> Result<R> {
    let status = response.status();
    if !status.is_success() {
        let body = parse_error_body(response).await;
        return Err(TimelineError::Xrpc {
            status: status.as_u16(),
            error: body.error,
            message: body.message,
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn parse_error_body(response: Response) -> XrpcErrorBody {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => serde_json::from_slice(&body).unwrap_or_else(|_| XrpcErrorBody {
            error: status.to_string(),
            message: String::from_utf8_lossy(&body).into_owned(),
        }),
        Err(e) => XrpcErrorBody {
            error: status.to_string(),
            message: e.to_string(),
        },
    }
}
