//! Wire types for the AT Protocol XRPC endpoints used here.
//!
//! Only the fields the timeline renders are modelled; everything else in the
//! lexicon is ignored on decode.

use serde::{Deserialize, Serialize};

/// Request body for `com.atproto.server.createSession`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Response of `com.atproto.server.createSession`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub access_jwt: String,
    #[serde(default)]
    pub refresh_jwt: String,
    pub handle: String,
    pub did: String,
}

/// Error body returned by XRPC endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrpcErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Response of `app.bsky.feed.getTimeline`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTimelineResponse {
    #[serde(default)]
    pub feed: Vec<FeedViewPost>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// `app.bsky.feed.defs#feedViewPost`
#[derive(Debug, Clone, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
    #[serde(default)]
    pub reason: Option<FeedReason>,
}

/// `app.bsky.feed.defs#postView`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub uri: String,
    pub cid: String,
    pub author: ProfileViewBasic,
    pub record: PostRecord,
    #[serde(default)]
    pub embed: Option<EmbedView>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub repost_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub quote_count: u64,
    #[serde(default)]
    pub indexed_at: Option<String>,
}

/// `app.bsky.actor.defs#profileViewBasic`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewBasic {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `app.bsky.feed.post` record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Why a post appears in the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "$type")]
pub enum FeedReason {
    #[serde(rename = "app.bsky.feed.defs#reasonRepost")]
    Repost { by: ProfileViewBasic },
    #[serde(other)]
    Other,
}

/// Hydrated embed attached to a post view.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "$type")]
pub enum EmbedView {
    #[serde(rename = "app.bsky.embed.images#view")]
    Images { images: Vec<ImageView> },
    #[serde(rename = "app.bsky.embed.record#view")]
    Record { record: EmbeddedRecord },
    #[serde(rename = "app.bsky.embed.external#view")]
    External { external: ExternalView },
    #[serde(rename = "app.bsky.embed.video#view")]
    Video {},
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageView {
    #[serde(default)]
    pub alt: String,
}

/// `app.bsky.embed.record#viewRecord`, or a blocked/missing placeholder
/// without a value.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedRecord {
    #[serde(default)]
    pub value: Option<EmbeddedValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedValue {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalView {
    #[serde(default)]
    pub title: String,
}
