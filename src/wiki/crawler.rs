use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Character, GameCode};

use super::parser::parse_character;
use super::response::{CategoryBatch, ARTICLE_NAMESPACE};

/// Source of raw page markup.
pub trait PageSource: Sync {
    fn page_content(&self, title: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Source of paginated category listings.
pub trait CategorySource: Sync {
    fn category_members(
        &self,
        category: &str,
        cursor: &str,
    ) -> impl Future<Output = Result<CategoryBatch>> + Send;
}

/// Article titles in `category`, in listing order.
///
/// Follows continuation cursors until the listing reports none. A failed
/// request fails the whole crawl; titles gathered from earlier pages are
/// dropped.
pub async fn crawl_category<S: CategorySource>(source: &S, category: &str) -> Result<Vec<String>> {
    let mut titles = Vec::new();
    let mut cursor = String::new();

    loop {
        let batch = source.category_members(category, &cursor).await?;
        titles.extend(
            batch
                .members
                .into_iter()
                .filter(|m| m.ns == ARTICLE_NAMESPACE)
                .map(|m| m.title),
        );

        if batch.next.is_empty() {
            break;
        }
        if batch.next == cursor {
            tracing::warn!("Listing for {} repeated cursor {}, stopping", category, cursor);
            break;
        }
        cursor = batch.next;
    }

    tracing::debug!("Found {} articles in {}", titles.len(), category);
    Ok(titles)
}

/// A page that was listed but did not yield a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub game: GameCode,
    pub characters: Vec<Character>,
    pub skipped: Vec<SkippedPage>,
}

/// Turns category listings into candidate character records.
pub struct Ingestor<S> {
    source: S,
    fetch_delay: Duration,
    max_concurrent_categories: usize,
}

impl<S: PageSource + CategorySource> Ingestor<S> {
    pub fn new(source: S, fetch_delay: Duration, max_concurrent_categories: usize) -> Self {
        Self {
            source,
            fetch_delay,
            max_concurrent_categories: max_concurrent_categories.max(1),
        }
    }

    /// Fetch and parse a single page.
    pub async fn fetch_character(&self, title: &str) -> Result<Character> {
        let content = self.source.page_content(title).await?;
        parse_character(title, &content)
    }

    /// Crawl one game's character category and parse every listed page.
    ///
    /// Pages are fetched one at a time with `fetch_delay` between requests.
    /// Pages that fail to fetch or parse are reported as skipped.
    pub async fn ingest_game(&self, game: GameCode) -> Result<IngestReport> {
        let category = game.category();
        let titles = crawl_category(&self.source, &category).await?;

        let mut report = IngestReport {
            game,
            characters: Vec::with_capacity(titles.len()),
            skipped: Vec::new(),
        };

        for (i, title) in titles.into_iter().enumerate() {
            if i > 0 && !self.fetch_delay.is_zero() {
                tokio::time::sleep(self.fetch_delay).await;
            }

            match self.fetch_character(&title).await {
                Ok(character) => report.characters.push(character),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", title, e);
                    report.skipped.push(SkippedPage {
                        title,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Ingested {} characters from {} ({} skipped)",
            report.characters.len(),
            category,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Ingest several games concurrently. Games whose crawl fails are logged
    /// and left out of the result.
    pub async fn ingest_games(&self, games: &[GameCode]) -> Vec<IngestReport> {
        stream::iter(games.iter().copied())
            .map(|game| async move {
                match self.ingest_game(game).await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::warn!("Failed to crawl {}: {}", game.category(), e);
                        None
                    }
                }
            })
            .buffer_unordered(self.max_concurrent_categories)
            .filter_map(|r| async { r })
            .collect()
            .await
    }
}
