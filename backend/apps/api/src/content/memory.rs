//! In-memory Repository Implementation

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::model::{Article, ArticleComment, Comment, ObjectId, Stats};
use super::repository::ContentRepository;

#[derive(Debug, Default)]
struct ContentData {
    stats: Option<Stats>,
    comments: Vec<Comment>,
    articles: Vec<Article>,
}

/// Process-local content store. Lists are kept in insertion order and
/// returned newest first.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    data: RwLock<ContentData>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ContentData> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContentData> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump(&self, apply: impl FnOnce(&mut Stats)) -> Stats {
        let mut data = self.write();
        let stats = data.stats.get_or_insert(Stats::ZERO);
        apply(stats);
        *stats
    }
}

impl ContentRepository for InMemoryContentRepository {
    async fn stats(&self) -> Stats {
        *self.write().stats.get_or_insert(Stats::INITIAL)
    }

    async fn record_view(&self) -> Stats {
        self.bump(|s| s.views += 1)
    }

    async fn record_like(&self) -> Stats {
        self.bump(|s| s.likes += 1)
    }

    async fn recent_comments(&self, limit: usize) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self.read().comments.iter().rev().cloned().collect();
        comments.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        comments.truncate(limit);
        comments
    }

    async fn add_comment(&self, comment: Comment) {
        self.write().comments.push(comment);
    }

    async fn articles(&self) -> Vec<Article> {
        let mut articles: Vec<Article> = self.read().articles.iter().rev().cloned().collect();
        articles.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        articles
    }

    async fn add_article(&self, article: Article) {
        self.write().articles.push(article);
    }

    async fn delete_article(&self, id: &ObjectId) -> bool {
        let mut data = self.write();
        let before = data.articles.len();
        data.articles.retain(|a| &a.id != id);
        data.articles.len() < before
    }

    async fn like_article(&self, id: &ObjectId) -> Option<u64> {
        let mut data = self.write();
        let article = data.articles.iter_mut().find(|a| &a.id == id)?;
        article.likes += 1;
        Some(article.likes)
    }

    async fn comment_on_article(&self, id: &ObjectId, comment: ArticleComment) -> bool {
        let mut data = self.write();
        match data.articles.iter_mut().find(|a| &a.id == id) {
            Some(article) => {
                article.comments.push(comment);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::LocalizedText;

    fn comment(text: &str, timestamp: i64) -> Comment {
        Comment {
            id: ObjectId::generate(),
            name: "n".into(),
            text: text.into(),
            timestamp,
        }
    }

    fn article(timestamp: i64) -> Article {
        let text = LocalizedText {
            ar: "x".into(),
            en: "x".into(),
        };
        Article {
            id: ObjectId::generate(),
            title: text.clone(),
            author: text.clone(),
            content: text,
            image: String::new(),
            image_position: 50,
            likes: 0,
            comments: Vec::new(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_stats_defaults() {
        let repo = InMemoryContentRepository::new();
        assert_eq!(repo.stats().await, Stats::INITIAL);
        assert_eq!(repo.record_like().await, Stats { views: 150, likes: 43 });

        let fresh = InMemoryContentRepository::new();
        assert_eq!(fresh.record_view().await, Stats { views: 1, likes: 0 });
    }

    #[tokio::test]
    async fn test_recent_comments_newest_first_and_capped() {
        let repo = InMemoryContentRepository::new();
        for i in 0..60 {
            repo.add_comment(comment(&i.to_string(), i)).await;
        }
        let recent = repo.recent_comments(50).await;
        assert_eq!(recent.len(), 50);
        assert_eq!(recent[0].text, "59");
        assert_eq!(recent[49].text, "10");
    }

    #[tokio::test]
    async fn test_article_lifecycle() {
        let repo = InMemoryContentRepository::new();
        let first = article(1);
        let second = article(2);
        repo.add_article(first.clone()).await;
        repo.add_article(second.clone()).await;

        let listed = repo.articles().await;
        assert_eq!(listed[0].id, second.id);

        assert_eq!(repo.like_article(&first.id).await, Some(1));
        assert_eq!(repo.like_article(&first.id).await, Some(2));
        let reply = ArticleComment {
            name: "زائر".into(),
            text: "hi".into(),
            timestamp: 3,
        };
        assert!(repo.comment_on_article(&first.id, reply).await);

        assert!(repo.delete_article(&first.id).await);
        assert!(!repo.delete_article(&first.id).await);
        assert_eq!(repo.like_article(&first.id).await, None);
        assert_eq!(repo.articles().await.len(), 1);
    }
}
