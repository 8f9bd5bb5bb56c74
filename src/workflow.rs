//! The news workflow engine: payload validation, the draft/published/archived
//! lifecycle, and partial-update application. Pure functions over
//! `NewsArticle`; persistence is the repository's concern.

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::{Category, CreateNewsRequest, NewsArticle, NewsStatus, UpdateNewsRequest};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 255;
pub const BODY_MIN: usize = 10;

fn validate_title(title: &str) -> Result<(), ApiError> {
    let len = title.chars().count();
    if len < TITLE_MIN || len > TITLE_MAX {
        return Err(ApiError::Validation(format!(
            "title must be between {TITLE_MIN} and {TITLE_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<(), ApiError> {
    if body.chars().count() < BODY_MIN {
        return Err(ApiError::Validation(format!(
            "body must be at least {BODY_MIN} characters"
        )));
    }
    Ok(())
}

pub fn parse_status(literal: &str) -> Result<NewsStatus, ApiError> {
    NewsStatus::parse(literal).ok_or_else(|| {
        let allowed = NewsStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::Validation(format!(
            "invalid news status: {literal}. allowed statuses: {allowed}"
        ))
    })
}

pub fn parse_category(literal: &str) -> Result<Category, ApiError> {
    Category::parse(literal).ok_or_else(|| {
        let allowed = Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::Validation(format!(
            "invalid category: {literal}. allowed categories: {allowed}"
        ))
    })
}

/// NewDraft
///
/// A validated creation payload, ready for insertion. Whatever status the
/// client asked for, a new article starts life as a Draft with zero views
/// and no publication timestamp.
#[derive(Debug, Clone)]
pub struct NewDraft {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub category: Category,
}

pub fn prepare_draft(req: CreateNewsRequest) -> Result<NewDraft, ApiError> {
    validate_title(&req.title)?;
    validate_body(&req.body)?;
    let category = match req.category.as_deref() {
        Some(literal) => parse_category(literal)?,
        None => Category::Live,
    };
    // req.status is deliberately ignored: creation always yields a Draft.
    Ok(NewDraft {
        title: req.title,
        body: req.body,
        url: req.url,
        author: req.author,
        tags: req.tags.unwrap_or_default(),
        category,
    })
}

/// Applies a partial update to an article in place. Absent fields are left
/// untouched; an explicit null clears the nullable URL slug and author
/// label. All validation and the
/// status-change gate run before the first field is assigned, so a failed
/// update leaves the article exactly as it was.
///
/// `may_change_status` is the caller's admin/moderator verdict: any status
/// field change, including the transition into Published, requires it.
/// Entering Published stamps `published_at` if and only if it was never set.
pub fn apply_update(
    article: &mut NewsArticle,
    req: UpdateNewsRequest,
    may_change_status: bool,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let new_status = match req.status.as_deref() {
        Some(literal) => {
            let status = parse_status(literal)?;
            if status != article.status && !may_change_status {
                return Err(ApiError::Forbidden(
                    "insufficient role: only admin or moderator may change article status"
                        .to_string(),
                ));
            }
            Some(status)
        }
        None => None,
    };
    let new_category = match req.category.as_deref() {
        Some(literal) => Some(parse_category(literal)?),
        None => None,
    };
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    if let Some(body) = &req.body {
        validate_body(body)?;
    }

    if let Some(title) = req.title {
        article.title = title;
    }
    if let Some(body) = req.body {
        article.body = body;
    }
    if let Some(url) = req.url {
        article.url = url;
    }
    if let Some(author) = req.author {
        article.author = author;
    }
    if let Some(tags) = req.tags {
        article.tags = tags;
    }
    if let Some(category) = new_category {
        article.category = category;
    }
    if let Some(status) = new_status {
        if status == NewsStatus::Published {
            // Set exactly once, on the first transition into Published.
            article.published_at.get_or_insert(now);
        }
        article.status = status;
    }
    article.redacted_at = Some(now);
    Ok(())
}

/// The dedicated publish transition. Publishing an already-published article
/// is a conflict; otherwise the status flips to Published, `published_at` is
/// stamped if it never was, and the edit timestamp is updated.
pub fn publish(article: &mut NewsArticle, now: DateTime<Utc>) -> Result<(), ApiError> {
    if article.status == NewsStatus::Published {
        return Err(ApiError::Conflict("article is already published".to_string()));
    }
    article.status = NewsStatus::Published;
    article.published_at.get_or_insert(now);
    article.redacted_at = Some(now);
    Ok(())
}
