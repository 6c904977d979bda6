use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// MediaWiki namespace of regular articles.
pub const ARTICLE_NAMESPACE: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQueryResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(default)]
    pub query: Option<PageQuery>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub pages: HashMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
pub struct WikiPage {
    #[serde(default)]
    pub pageid: i64,
    #[serde(default)]
    #[allow(dead_code)]
    pub title: String,
    /// Present (as an empty string) when the page does not exist.
    #[serde(default)]
    pub missing: Option<serde_json::Value>,
    #[serde(default)]
    pub revisions: Vec<WikiRevision>,
}

impl WikiPage {
    fn is_missing(&self) -> bool {
        self.missing.is_some() || self.pageid < 0
    }
}

#[derive(Debug, Deserialize)]
pub struct WikiRevision {
    pub slots: RevisionSlots,
}

#[derive(Debug, Deserialize)]
pub struct RevisionSlots {
    pub main: MainSlot,
}

#[derive(Debug, Deserialize)]
pub struct MainSlot {
    #[serde(rename = "*", alias = "content")]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(rename = "continue", default)]
    pub continuation: Option<CategoryContinue>,
    #[serde(default)]
    pub query: Option<CategoryQuery>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryContinue {
    #[serde(default)]
    pub cmcontinue: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryMember {
    #[serde(default)]
    #[allow(dead_code)]
    pub pageid: i64,
    pub ns: i64,
    pub title: String,
}

/// One page of a category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBatch {
    pub members: Vec<CategoryMember>,
    /// Cursor for the next page; empty on the last page.
    pub next: String,
}

fn api_error(err: ApiError) -> AppError {
    AppError::WikiApi(format!("{}: {}", err.code, err.info))
}

/// Raw markup of the requested page.
pub fn page_content(title: &str, response: PageQueryResponse) -> Result<String> {
    if let Some(err) = response.error {
        return Err(api_error(err));
    }

    let pages = response.query.map(|q| q.pages).unwrap_or_default();
    for page in pages.into_values() {
        if page.is_missing() {
            return Err(AppError::NotFound(title.to_string()));
        }
        if let Some(revision) = page.revisions.into_iter().next() {
            return Ok(revision.slots.main.content);
        }
    }

    Err(AppError::NoContent(title.to_string()))
}

pub fn category_batch(response: CategoryResponse) -> Result<CategoryBatch> {
    if let Some(err) = response.error {
        return Err(api_error(err));
    }

    Ok(CategoryBatch {
        members: response
            .query
            .map(|q| q.categorymembers)
            .unwrap_or_default(),
        next: response
            .continuation
            .map(|c| c.cmcontinue)
            .unwrap_or_default(),
    })
}
