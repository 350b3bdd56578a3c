//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use captcha::{CaptchaAppState, InMemoryCaptchaRepository};
use platform::clock::SharedClock;

use super::dto::{
    ArticleCommentRequest, CreateArticleRequest, CreateCommentRequest, CreateCommentResponse,
    LikesResponse, SuccessResponse, UploadResponse,
};
use super::error::{ContentError, ContentResult};
use super::model::{Article, ArticleComment, Comment, ObjectId, Stats};
use super::repository::ContentRepository;
use super::upload::read_image;

/// Comments returned by `GET /api/comments`
pub const COMMENTS_PAGE: usize = 50;

/// Shared state for content handlers
pub struct ContentAppState<R>
where
    R: ContentRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub captcha: CaptchaAppState<InMemoryCaptchaRepository>,
    pub clock: SharedClock,
}

impl<R> Clone for ContentAppState<R>
where
    R: ContentRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            captcha: self.captcha.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<R> ContentAppState<R>
where
    R: ContentRepository + Send + Sync + 'static,
{
    pub fn new(
        repo: R,
        captcha: CaptchaAppState<InMemoryCaptchaRepository>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            captcha,
            clock,
        }
    }
}

fn article_id(raw: &str) -> ContentResult<ObjectId> {
    ObjectId::parse(raw).ok_or(ContentError::InvalidArticleId)
}

/// GET /api/stats
pub async fn get_stats<R>(State(state): State<ContentAppState<R>>) -> Json<Stats>
where
    R: ContentRepository + Send + Sync + 'static,
{
    Json(state.repo.stats().await)
}

/// POST /api/stats/view
pub async fn record_view<R>(State(state): State<ContentAppState<R>>) -> Json<Stats>
where
    R: ContentRepository + Send + Sync + 'static,
{
    Json(state.repo.record_view().await)
}

/// POST /api/stats/like
pub async fn record_like<R>(State(state): State<ContentAppState<R>>) -> Json<Stats>
where
    R: ContentRepository + Send + Sync + 'static,
{
    Json(state.repo.record_like().await)
}

/// GET /api/comments
pub async fn list_comments<R>(State(state): State<ContentAppState<R>>) -> Json<Vec<Comment>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    Json(state.repo.recent_comments(COMMENTS_PAGE).await)
}

/// POST /api/comments
///
/// The captcha is redeemed before the fields are looked at, so a request
/// with bad fields still spends its captcha.
pub async fn create_comment<R>(
    State(state): State<ContentAppState<R>>,
    body: Bytes,
) -> ContentResult<Json<CreateCommentResponse>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    let request = CreateCommentRequest::from_body(&body);
    state.captcha.verify(&request.captcha()).await?;
    let fields = request.validate()?;

    let comment = Comment {
        id: ObjectId::generate(),
        name: fields.name,
        text: fields.text,
        timestamp: state.clock.now_ms(),
    };
    state.repo.add_comment(comment.clone()).await;
    tracing::info!(comment_id = %comment.id, "Comment posted");

    Ok(Json(CreateCommentResponse {
        success: true,
        comment,
    }))
}

/// GET /api/articles
pub async fn list_articles<R>(State(state): State<ContentAppState<R>>) -> Json<Vec<Article>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    Json(state.repo.articles().await)
}

/// POST /api/articles (admin)
pub async fn create_article<R>(
    State(state): State<ContentAppState<R>>,
    body: Bytes,
) -> ContentResult<Json<Article>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    let fields = CreateArticleRequest::from_body(&body).validate()?;

    let article = Article {
        id: ObjectId::generate(),
        title: fields.title,
        author: fields.author,
        content: fields.content,
        image: fields.image,
        image_position: fields.image_position,
        likes: 0,
        comments: Vec::new(),
        timestamp: state.clock.now_ms(),
    };
    state.repo.add_article(article.clone()).await;
    tracing::info!(article_id = %article.id, "Article created");

    Ok(Json(article))
}

/// DELETE /api/articles/{id} (admin)
pub async fn delete_article<R>(
    State(state): State<ContentAppState<R>>,
    Path(id): Path<String>,
) -> ContentResult<Json<SuccessResponse>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    let id = article_id(&id)?;
    if !state.repo.delete_article(&id).await {
        return Err(ContentError::ArticleNotFound);
    }
    tracing::info!(article_id = %id, "Article deleted by admin");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/articles/{id}/like
pub async fn like_article<R>(
    State(state): State<ContentAppState<R>>,
    Path(id): Path<String>,
) -> ContentResult<Json<LikesResponse>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    let id = article_id(&id)?;
    let likes = state
        .repo
        .like_article(&id)
        .await
        .ok_or(ContentError::ArticleNotFound)?;
    Ok(Json(LikesResponse { likes }))
}

/// POST /api/articles/{id}/comments
pub async fn comment_on_article<R>(
    State(state): State<ContentAppState<R>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ContentResult<Json<ArticleComment>>
where
    R: ContentRepository + Send + Sync + 'static,
{
    let id = article_id(&id)?;
    let fields = ArticleCommentRequest::from_body(&body).validate()?;

    let comment = ArticleComment {
        name: fields.name,
        text: fields.text,
        timestamp: state.clock.now_ms(),
    };
    if !state.repo.comment_on_article(&id, comment.clone()).await {
        return Err(ContentError::ArticleNotFound);
    }
    Ok(Json(comment))
}

/// POST /api/upload (admin)
pub async fn upload_image(multipart: Multipart) -> ContentResult<Json<UploadResponse>> {
    let image = read_image(multipart).await?;
    Ok(Json(UploadResponse {
        success: true,
        url: image.data_url(),
    }))
}
