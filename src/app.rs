use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{CharacterStore, Repository};
use crate::error::{AppError, Result};
use crate::game::DailySelection;
use crate::models::{Character, GameCode};
use crate::wiki::{IngestReport, Ingestor, WikiClient};

/// Totals for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub categories: usize,
    pub failed_categories: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub skipped_pages: usize,
    pub store_failures: usize,
}

pub struct App {
    pub repository: Repository,
    ingestor: Ingestor<WikiClient>,
    daily: Arc<DailySelection<Repository>>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let policy = config.validity_policy();
        let repository = Repository::new(&config.db_path).await?.with_policy(policy);
        let client = WikiClient::new(config)?;
        let ingestor = Ingestor::new(
            client,
            config.fetch_delay(),
            config.max_concurrent_categories,
        );
        let daily = Arc::new(DailySelection::new(repository.clone(), policy));

        Ok(Self {
            repository,
            ingestor,
            daily,
        })
    }

    /// Shared handle to the daily selection service.
    pub fn daily(&self) -> Arc<DailySelection<Repository>> {
        Arc::clone(&self.daily)
    }

    /// Crawl the given games and store every parsed character. A character
    /// listed under several games is stored once.
    pub async fn ingest(&self, games: &[GameCode]) -> Result<IngestSummary> {
        let reports = self.ingestor.ingest_games(games).await;
        let summary = store_reports(&self.repository, games.len(), reports).await;

        tracing::info!(
            "Stored {} characters from {} categories ({} failed to store)",
            summary.stored,
            summary.categories,
            summary.store_failures
        );
        Ok(summary)
    }

    /// Fetch and parse one wiki page without storing it.
    pub async fn fetch_character(&self, title: &str) -> Result<Character> {
        self.ingestor.fetch_character(title).await
    }

    /// Stored character by wiki title, falling back to its display name.
    pub async fn show_character(&self, title: &str) -> Result<Character> {
        match self.repository.get_by_wiki_title(title).await {
            Err(AppError::RecordNotFound(_)) => self.repository.get_by_name(title).await,
            other => other,
        }
    }
}

/// Merge the reports of one ingestion run into `store`, keeping the first
/// record seen for each wiki title. `requested` is the number of games the
/// run was asked to crawl.
pub async fn store_reports<S: CharacterStore>(
    store: &S,
    requested: usize,
    reports: Vec<IngestReport>,
) -> IngestSummary {
    let mut summary = IngestSummary {
        categories: reports.len(),
        failed_categories: requested.saturating_sub(reports.len()),
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for report in reports {
        summary.skipped_pages += report.skipped.len();
        for character in report.characters {
            if !seen.insert(character.wiki_title.clone()) {
                summary.duplicates += 1;
                continue;
            }
            let title = character.wiki_title.clone();
            match store.add(character).await {
                Ok(_) => summary.stored += 1,
                Err(e) => {
                    tracing::warn!("Failed to store {}: {}", title, e);
                    summary.store_failures += 1;
                }
            }
        }
    }

    summary
}
