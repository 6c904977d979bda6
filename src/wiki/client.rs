use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{AppError, Result};

use super::crawler::{CategorySource, PageSource};
use super::response::{self, CategoryBatch, CategoryResponse, PageQueryResponse};

const USER_AGENT_STRING: &str = "falloutdle/1.0";
const CATEGORY_PAGE_LIMIT: &str = "500";

/// Client for the MediaWiki `api.php` endpoint of the Fallout wiki.
pub struct WikiClient {
    client: Client,
    base_url: String,
}

impl WikiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT_STRING)
            .build()?;

        Ok(Self {
            client,
            base_url: config.wiki_api_url.clone(),
        })
    }

    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", "query"), ("format", "json")])
            .query(params)
            .send()
            .await?;

        check_status(response.status())?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Raw wiki markup of the latest revision of `title`.
    pub async fn get_page_content(&self, title: &str) -> Result<String> {
        let response: PageQueryResponse = self
            .query(&[
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("titles", title),
            ])
            .await?;

        response::page_content(title, response)
    }

    /// One page of the member listing of `category`. An empty `cursor`
    /// requests the first page.
    pub async fn get_category_members(&self, category: &str, cursor: &str) -> Result<CategoryBatch> {
        let mut params = vec![
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmlimit", CATEGORY_PAGE_LIMIT),
        ];
        if !cursor.is_empty() {
            params.push(("cmcontinue", cursor));
        }

        let response: CategoryResponse = self.query(&params).await?;
        response::category_batch(response)
    }
}

/// Non-2xx responses are reported as wiki API errors.
fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AppError::WikiApi(format!("HTTP {}", status)))
    }
}

impl PageSource for WikiClient {
    async fn page_content(&self, title: &str) -> Result<String> {
        self.get_page_content(title).await
    }
}

impl CategorySource for WikiClient {
    async fn category_members(&self, category: &str, cursor: &str) -> Result<CategoryBatch> {
        self.get_category_members(category, cursor).await
    }
}
