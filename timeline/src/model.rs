//! Typed post schema exposed to the voice engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atproto::{EmbedView, FeedReason, FeedViewPost, ProfileViewBasic};

/// Author of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
}

impl Author {
    /// Display name, falling back to the handle when unset or blank.
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.handle,
        }
    }
}

impl From<&ProfileViewBasic> for Author {
    fn from(p: &ProfileViewBasic) -> Self {
        Self {
            did: p.did.clone(),
            handle: p.handle.clone(),
            display_name: p.display_name.clone(),
        }
    }
}

/// Engagement counters of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
    pub quotes: u64,
}

/// What is embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedSummary {
    Images { count: usize, alt_texts: Vec<String> },
    Quote { text: String },
    Link { title: String },
    Video,
    Other,
}

impl From<&EmbedView> for EmbedSummary {
    fn from(embed: &EmbedView) -> Self {
        match embed {
            EmbedView::Images { images } => EmbedSummary::Images {
                count: images.len(),
                alt_texts: images
                    .iter()
                    .filter(|i| !i.alt.trim().is_empty())
                    .map(|i| i.alt.clone())
                    .collect(),
            },
            EmbedView::Record { record } => match record.value.as_ref().and_then(|v| v.text.clone()) {
                Some(text) => EmbedSummary::Quote { text },
                None => EmbedSummary::Other,
            },
            EmbedView::External { external } => EmbedSummary::Link {
                title: external.title.clone(),
            },
            EmbedView::Video {} => EmbedSummary::Video,
            EmbedView::Other => EmbedSummary::Other,
        }
    }
}

/// Minimal view of one post, as listed on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// 1-based sequence number within the snapshot.
    pub number: usize,
    pub uri: String,
    pub cid: String,
    pub author: Author,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Full view of one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    /// 1-based sequence number within the snapshot.
    pub number: usize,
    pub uri: String,
    pub cid: String,
    pub author: Author,
    pub text: String,
    pub engagement: Engagement,
    pub embed: Option<EmbedSummary>,
    /// Set when the post appears in the feed as someone's repost.
    pub reposted_by: Option<Author>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PostDetail {
    /// Builds the detail for the feed entry at `number`.
    pub fn from_feed_view(number: usize, view: &FeedViewPost) -> Self {
        let post = &view.post;
        let created_at = post
            .record
            .created_at
            .as_deref()
            .or(post.indexed_at.as_deref())
            .and_then(parse_timestamp);

        Self {
            number,
            uri: post.uri.clone(),
            cid: post.cid.clone(),
            author: Author::from(&post.author),
            text: post.record.text.clone(),
            engagement: Engagement {
                likes: post.like_count,
                reposts: post.repost_count,
                replies: post.reply_count,
                quotes: post.quote_count,
            },
            embed: post.embed.as_ref().map(EmbedSummary::from),
            reposted_by: match view.reason {
                Some(FeedReason::Repost { ref by }) => Some(Author::from(by)),
                _ => None,
            },
            created_at,
        }
    }

    /// Returns the summary of this post.
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            number: self.number,
            uri: self.uri.clone(),
            cid: self.cid.clone(),
            author: self.author.clone(),
            text: self.text.clone(),
            created_at: self.created_at,
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
