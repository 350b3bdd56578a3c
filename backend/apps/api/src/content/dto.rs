//! Data Transfer Objects
//!
//! Request fields are kept as loose JSON so that absent, empty and
//! wrongly typed values can each be answered the way the site expects.

use std::sync::LazyLock;

use captcha::VerifyCaptchaInput;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{ContentError, ContentResult};
use super::model::{Comment, LocalizedText};

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_TEXT_CHARS: usize = 500;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 10_000;
pub const DEFAULT_IMAGE_POSITION: u8 = 50;

pub const ANONYMOUS_AR: &str = "مجهول";
pub const ANONYMOUS_EN: &str = "Anonymous";
pub const VISITOR_AR: &str = "زائر";

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://.+|/uploads/.+|data:image/.+)$").expect("image URL pattern compiles")
});

/// Parse a raw body; anything unparseable counts as an empty request
fn parse_body<T: Default + for<'de> Deserialize<'de>>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// null, false, 0 and "" are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A non-empty string, or nothing
fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn too_long(s: &str, max: usize) -> bool {
    s.chars().count() > max
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub name: Value,
    pub text: Value,
    pub captcha_token: Value,
    /// `None` only when the field is absent; an explicit `null` is kept
    #[serde(deserialize_with = "present_value")]
    pub captcha_answer: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Validated comment fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub name: String,
    pub text: String,
}

impl CreateCommentRequest {
    pub fn from_body(body: &[u8]) -> Self {
        parse_body(body)
    }

    /// Captcha fields, checked before anything else
    pub fn captcha(&self) -> VerifyCaptchaInput {
        VerifyCaptchaInput {
            token: self.captcha_token.as_str().map(str::to_owned),
            answer: self.captcha_answer.clone(),
        }
    }

    pub fn validate(self) -> ContentResult<NewComment> {
        if !is_truthy(&self.name) || !is_truthy(&self.text) {
            return Err(ContentError::MissingFields);
        }
        let (Value::String(name), Value::String(text)) = (self.name, self.text) else {
            return Err(ContentError::InvalidInputType);
        };
        if too_long(&name, MAX_NAME_CHARS) || too_long(&text, MAX_TEXT_CHARS) {
            return Err(ContentError::InputTooLong);
        }
        Ok(NewComment { name, text })
    }
}

#[derive(Debug, Serialize)]
pub struct CreateCommentResponse {
    pub success: bool,
    pub comment: Comment,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title_ar: Value,
    pub title_en: Value,
    pub author_ar: Value,
    pub author_en: Value,
    pub content_ar: Value,
    pub content_en: Value,
    pub image: Value,
    pub image_position: Value,
}

/// Validated article fields with bilingual defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: LocalizedText,
    pub author: LocalizedText,
    pub content: LocalizedText,
    pub image: String,
    pub image_position: u8,
}

impl CreateArticleRequest {
    pub fn from_body(body: &[u8]) -> Self {
        parse_body(body)
    }

    pub fn validate(self) -> ContentResult<NewArticle> {
        let image_position = parse_image_position(&self.image_position);

        let (Some(title_ar), Some(content_ar)) = (
            non_empty_string(self.title_ar),
            non_empty_string(self.content_ar),
        ) else {
            return Err(ContentError::MissingArticleFields);
        };
        if too_long(&title_ar, MAX_TITLE_CHARS) || too_long(&content_ar, MAX_CONTENT_CHARS) {
            return Err(ContentError::ContentTooLong);
        }

        let image = non_empty_string(self.image).unwrap_or_default();
        if !image.is_empty() && !IMAGE_URL.is_match(&image) {
            return Err(ContentError::InvalidImageUrl);
        }

        let author_ar = non_empty_string(self.author_ar);
        let author_en = non_empty_string(self.author_en)
            .or_else(|| author_ar.clone())
            .unwrap_or_else(|| ANONYMOUS_EN.to_owned());

        Ok(NewArticle {
            title: LocalizedText {
                en: non_empty_string(self.title_en).unwrap_or_else(|| title_ar.clone()),
                ar: title_ar,
            },
            author: LocalizedText {
                ar: author_ar.unwrap_or_else(|| ANONYMOUS_AR.to_owned()),
                en: author_en,
            },
            content: LocalizedText {
                en: non_empty_string(self.content_en).unwrap_or_else(|| content_ar.clone()),
                ar: content_ar,
            },
            image,
            image_position,
        })
    }
}

/// Integer prefix of a number or numeric string, kept only inside 0..=100
fn parse_image_position(value: &Value) -> u8 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        Value::String(s) => leading_integer(s.trim()),
        _ => None,
    };
    parsed
        .and_then(|p| u8::try_from(p).ok())
        .filter(|p| *p <= 100)
        .unwrap_or(DEFAULT_IMAGE_POSITION)
}

fn leading_integer(s: &str) -> Option<i64> {
    let digits_from = usize::from(s.starts_with(['-', '+']));
    let end = s[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |i| i + digits_from);
    s[..end].parse().ok()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleCommentRequest {
    pub name: Value,
    pub text: Value,
}

impl ArticleCommentRequest {
    pub fn from_body(body: &[u8]) -> Self {
        parse_body(body)
    }

    pub fn validate(self) -> ContentResult<NewComment> {
        let text = non_empty_string(self.text).ok_or(ContentError::CommentTextRequired)?;
        let name = non_empty_string(self.name);
        let name_too_long = name.as_deref().is_some_and(|n| too_long(n, MAX_NAME_CHARS));
        if too_long(&text, MAX_TEXT_CHARS) || name_too_long {
            return Err(ContentError::InputTooLong);
        }
        Ok(NewComment {
            name: name.unwrap_or_else(|| VISITOR_AR.to_owned()),
            text,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub likes: u64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
}
