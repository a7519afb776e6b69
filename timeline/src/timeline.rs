//! Live Bluesky home timeline.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::client::{AuthSession, XrpcClient, DEFAULT_SERVICE};
use crate::error::{Result, TimelineError};
use crate::model::{PostDetail, PostSummary};
use crate::provider::{FeedProvider, Snapshot, PAGE_SIZE};

/// Default number of posts fetched per snapshot.
pub const DEFAULT_FETCH_LIMIT: u32 = 50;

/// Connection settings for [`Timeline`].
#[derive(Clone)]
pub struct TimelineConfig {
    pub service: String,
    pub handle: String,
    pub app_password: String,
    pub fetch_limit: u32,
    pub page_size: usize,
}

impl TimelineConfig {
    /// Settings for `handle` on the default service.
    pub fn new(handle: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            handle: handle.into(),
            app_password: app_password.into(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            page_size: PAGE_SIZE,
        }
    }
}

impl std::fmt::Debug for TimelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineConfig")
            .field("service", &self.service)
            .field("handle", &self.handle)
            .field("fetch_limit", &self.fetch_limit)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Home timeline of one account, served from the last fetched snapshot.
///
/// Queries fail with [`TimelineError::NotInitialized`] until
/// [`Timeline::initialize`] succeeds.
pub struct Timeline {
    client: XrpcClient,
    config: TimelineConfig,
    auth: RwLock<Option<AuthSession>>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Result<Self> {
        Ok(Self {
            client: XrpcClient::new(config.service.clone())?,
            config,
            auth: RwLock::new(None),
            snapshot: RwLock::new(None),
        })
    }

    /// Logs in and fetches the first snapshot.
    pub async fn initialize(&self) -> Result<()> {
        let auth = self
            .client
            .create_session(&self.config.handle, &self.config.app_password)
            .await?;
        info!(handle = %auth.handle, "bluesky login ok");
        *self.auth.write().await = Some(auth);
        self.refresh().await
    }

    /// Replaces the snapshot with a fresh fetch. Sequence numbers restart at 1.
    pub async fn refresh(&self) -> Result<()> {
        let auth = self
            .auth
            .read()
            .await
            .clone()
            .ok_or(TimelineError::NotInitialized)?;
        let feed = self
            .client
            .get_timeline(&auth, self.config.fetch_limit)
            .await?;
        let posts = feed
            .iter()
            .enumerate()
            .map(|(idx, view)| PostDetail::from_feed_view(idx + 1, view))
            .collect();
        let snapshot = Snapshot::with_page_size(posts, self.config.page_size);
        info!(posts = snapshot.len(), "timeline snapshot ready");
        *self.snapshot.write().await = Some(Arc::new(snapshot));
        Ok(())
    }

    async fn current(&self) -> Result<Arc<Snapshot>> {
        self.snapshot
            .read()
            .await
            .clone()
            .ok_or(TimelineError::NotInitialized)
    }
}

#[async_trait]
impl FeedProvider for Timeline {
    async fn page(&self, n: usize) -> Result<Vec<PostSummary>> {
        self.current().await?.page(n)
    }

    async fn detail(&self, number: usize) -> Result<PostDetail> {
        self.current().await?.detail(number)
    }
}
