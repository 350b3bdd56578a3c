//! Repository Trait
//!
//! Storage interface for site content. The server ships with the in-memory
//! implementation; a document database can slot in behind the same trait.

use super::model::{Article, ArticleComment, Comment, ObjectId, Stats};

#[trait_variant::make(ContentRepository: Send)]
pub trait LocalContentRepository {
    /// Current counters, initialised to [`Stats::INITIAL`] on first read
    async fn stats(&self) -> Stats;

    async fn record_view(&self) -> Stats;

    async fn record_like(&self) -> Stats;

    /// Newest first
    async fn recent_comments(&self, limit: usize) -> Vec<Comment>;

    async fn add_comment(&self, comment: Comment);

    /// Newest first
    async fn articles(&self) -> Vec<Article>;

    async fn add_article(&self, article: Article);

    async fn delete_article(&self, id: &ObjectId) -> bool;

    /// New like count, or `None` for an unknown article
    async fn like_article(&self, id: &ObjectId) -> Option<u64>;

    /// Returns whether the article exists
    async fn comment_on_article(&self, id: &ObjectId, comment: ArticleComment) -> bool;
}
