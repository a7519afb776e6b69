//! The paginated content source consumed by function calls.

use async_trait::async_trait;

use crate::error::{Result, TimelineError};
use crate::model::{PostDetail, PostSummary};

/// Number of summaries per page.
pub const PAGE_SIZE: usize = 10;

/// A paginated source of posts.
///
/// Sequence numbers are 1-based and only stable within one fetched snapshot.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Returns the summaries on 1-based page `n`. Pages past the end are empty.
    async fn page(&self, n: usize) -> Result<Vec<PostSummary>>;

    /// Returns the full detail of the post with 1-based sequence number `number`.
    async fn detail(&self, number: usize) -> Result<PostDetail>;
}

/// An immutable, numbered list of posts.
#[derive(Debug, Clone)]
pub struct Snapshot {
    posts: Vec<PostDetail>,
    page_size: usize,
}

impl Snapshot {
    /// Creates a snapshot, renumbering posts 1..=len in order.
    pub fn new(posts: Vec<PostDetail>) -> Self {
        Self::with_page_size(posts, PAGE_SIZE)
    }

    /// Like [`Snapshot::new`] with a custom page size (minimum 1).
    pub fn with_page_size(mut posts: Vec<PostDetail>, page_size: usize) -> Self {
        for (idx, post) in posts.iter_mut().enumerate() {
            post.number = idx + 1;
        }
        Self {
            posts,
            page_size: page_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Summaries on 1-based page `n`.
    pub fn page(&self, n: usize) -> Result<Vec<PostSummary>> {
        if n == 0 {
            return Err(TimelineError::InvalidPage(n));
        }
        let start = (n - 1).saturating_mul(self.page_size);
        Ok(self
            .posts
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(PostDetail::summary)
            .collect())
    }

    /// Detail of the post with 1-based sequence number `number`.
    pub fn detail(&self, number: usize) -> Result<PostDetail> {
        number
            .checked_sub(1)
            .and_then(|idx| self.posts.get(idx))
            .cloned()
            .ok_or(TimelineError::PostNotFound(number))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl FeedProvider for Snapshot {
    async fn page(&self, n: usize) -> Result<Vec<PostSummary>> {
        Snapshot::page(self, n)
    }

    async fn detail(&self, number: usize) -> Result<PostDetail> {
        Snapshot::detail(self, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, Engagement};

    fn post(cid: &str) -> PostDetail {
        PostDetail {
            number: 0,
            uri: format!("at://p/{}", cid),
            cid: cid.to_string(),
            author: Author {
                did: "did:plc:a".into(),
                handle: "a.test".into(),
                display_name: None,
            },
            text: cid.to_string(),
            engagement: Engagement::default(),
            embed: None,
            reposted_by: None,
            created_at: None,
        }
    }

    #[test]
    fn test_snapshot_numbering_and_pages() {
        let posts = (0..7).map(|i| post(&format!("c{}", i))).collect();
        let snapshot = Snapshot::with_page_size(posts, 3);
        assert_eq!(snapshot.len(), 7);

        let page2 = snapshot.page(2).unwrap();
        assert_eq!(page2.iter().map(|p| p.number).collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(page2[0].cid, "c3");
        assert_eq!(snapshot.page(3).unwrap().len(), 1);
        assert!(snapshot.page(9).unwrap().is_empty());
        assert!(snapshot.page(usize::MAX).unwrap().is_empty());

        assert_eq!(snapshot.detail(4).unwrap().cid, "c3");
        assert!(matches!(snapshot.detail(8), Err(TimelineError::PostNotFound(8))));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert!(matches!(snapshot.page(0), Err(TimelineError::InvalidPage(0))));
        assert!(snapshot.page(1).unwrap().is_empty());
    }
}
