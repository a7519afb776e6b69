//! Bluesky home timeline for skytalk.
//!
//! Logs in over XRPC, fetches a reverse-chronological snapshot of the home
//! timeline, and serves numbered pages and post details from it through the
//! [`FeedProvider`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use skytalk_timeline::{render, FeedProvider, Timeline, TimelineConfig};
//!
//! # async fn run() -> skytalk_timeline::Result<()> {
//! let timeline = Timeline::new(TimelineConfig::new("alice.bsky.social", "app-password"))?;
//! timeline.initialize().await?;
//!
//! let page = timeline.page(1).await?;
//! println!("{}", render::format_page(&page, chrono::Utc::now()));
//! # Ok(())
//! # }
//! ```

pub mod atproto;
pub mod client;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod timeline;

pub use client::{AuthSession, XrpcClient, DEFAULT_SERVICE};
pub use error::{Result, TimelineError};
pub use model::{Author, EmbedSummary, Engagement, PostDetail, PostSummary};
pub use provider::{FeedProvider, Snapshot, PAGE_SIZE};
pub use timeline::{Timeline, TimelineConfig, DEFAULT_FETCH_LIMIT};
