//! Remote book catalog API client
//!
//! Queries the upstream book search API by ISBN and downloads cover art.
//! Credentials are supplied via process configuration, never hardcoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "odeon-admin/0.1.0";
const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Structured book metadata extracted from the catalog API
///
/// The upstream corpus treats ISBN as unique, so only the first result item
/// for a query is ever consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub author: String,
    pub title: String,
    pub publisher: String,
    /// Cover image URL
    pub image: String,
    pub isbn: String,
    pub description: String,
}

/// Capability seam over the remote catalog, mockable in tests
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Search the catalog by ISBN; `Ok(None)` when the corpus has no match.
    async fn search_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, CatalogError>;

    /// Download cover image bytes from a metadata image URL.
    async fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError>;
}

/// Search response wrapper (`items` array, first element consulted)
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    author: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    publisher: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    isbn: String,
    #[serde(default)]
    description: String,
}

/// Catalog API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl CatalogClient {
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
    ) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            client_id,
            client_secret,
        })
    }
}

#[async_trait]
impl BookCatalog for CatalogClient {
    async fn search_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>, CatalogError> {
        tracing::debug!(isbn = %isbn, url = %self.base_url, "Querying catalog API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("query", isbn)])
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(CLIENT_SECRET_HEADER, &self.client_secret)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let Some(item) = search.items.into_iter().next() else {
            return Ok(None);
        };

        tracing::info!(
            isbn = %isbn,
            title = %item.title,
            "Retrieved book metadata from catalog"
        );

        Ok(Some(BookMetadata {
            author: item.author,
            title: item.title,
            publisher: item.publisher,
            image: item.image,
            isbn: item.isbn,
            description: item.description,
        }))
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Api(status.as_u16(), url.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::new(
            "https://catalog.example/v1/search/book.json".to_string(),
            "id".to_string(),
            "secret".to_string(),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_search_response_parses_items() {
        let json = r#"{"total":1,"items":[{"title":"The Trial","author":"Franz Kafka",
            "publisher":"Schocken","image":"https://img.example/trial.jpg",
            "isbn":"9780805209990","description":"A novel."}]}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].title, "The Trial");
    }

    #[test]
    fn test_search_response_tolerates_missing_items() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(parsed.items.is_empty());
    }
}
