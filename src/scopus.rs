//! Scopus Search API client.
//!
//! Thin collaborator around the Elsevier Scopus Search endpoint: one bounded
//! request per search, no cursor pagination, no retries. Service failures
//! (network, auth, rate-limit) surface as typed errors for the caller to
//! report verbatim.
//!
//! API details:
//! - Endpoint: GET /content/search/scopus
//! - Auth: `X-ELS-APIKey` header
//! - Max 200 results per request in STANDARD view

use crate::error::{Result, ScopusError};
use crate::query::BooleanQuery;
use crate::record::PublicationRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Scopus Search API endpoint
pub const SCOPUS_API_BASE: &str = "https://api.elsevier.com/content/search/scopus";

/// Maximum results per request (Scopus STANDARD view limit)
pub const MAX_COUNT: usize = 200;

/// Result view mode requested from Scopus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Standard,
    Complete,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Standard => "STANDARD",
            View::Complete => "COMPLETE",
        }
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(View::Standard),
            "COMPLETE" => Ok(View::Complete),
            other => Err(format!("Unknown view: {other} (expected STANDARD or COMPLETE)")),
        }
    }
}

/// Query options for a Scopus search
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Result-count limit (capped at [`MAX_COUNT`])
    pub count: usize,
    /// Result view mode
    pub view: View,
    /// Custom base URL (mirror/proxy endpoints)
    pub base_url: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            count: MAX_COUNT,
            view: View::Standard,
            base_url: None,
        }
    }
}

/// Scopus Search API client
pub struct ScopusClient {
    api_key: String,
    client: Client,
}

impl ScopusClient {
    /// Create a new client for the given API key.
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScopusError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { api_key, client })
    }

    /// Run one bounded search and return the result set.
    ///
    /// An empty result set is a valid outcome, not an error; Scopus signals
    /// it with an error entry inside a 200 response.
    pub async fn search(
        &self,
        query: &BooleanQuery,
        options: &QueryOptions,
    ) -> Result<Vec<PublicationRecord>> {
        let endpoint = match &options.base_url {
            Some(base) => {
                Url::parse(base)
                    .map_err(|e| ScopusError::Config(format!("Invalid base URL: {}", e)))?;
                base.trim_end_matches('/').to_string()
            }
            None => SCOPUS_API_BASE.to_string(),
        };

        let count = options.count.min(MAX_COUNT);

        info!(
            query = query.as_str(),
            count = count,
            view = options.view.as_str(),
            "Searching Scopus"
        );

        let count_param = count.to_string();
        let response = self
            .client
            .get(&endpoint)
            .header("X-ELS-APIKey", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("query", query.as_str()),
                ("count", count_param.as_str()),
                ("view", options.view.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ScopusError::Auth(format!(
                    "Scopus rejected the API key (HTTP {})",
                    status.as_u16()
                )));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                return Err(ScopusError::RateLimited(retry_after));
            }
            s if !s.is_success() => {
                let message = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "Scopus API error");
                return Err(ScopusError::Api {
                    code: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let body: SearchResponse = response.json().await?;
        let total = body.search_results.total_results.clone();
        let records = records_from_response(body);
        info!(
            results = records.len(),
            total = total.as_deref().unwrap_or("unknown"),
            "Scopus search complete"
        );
        Ok(records)
    }
}

// === Scopus API Response Types ===

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "search-results")]
    search_results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    /// Total hits reported by Scopus, logged next to the fetched count
    #[serde(rename = "opensearch:totalResults", default)]
    total_results: Option<String>,
    #[serde(default)]
    entry: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize, Default)]
struct SearchEntry {
    /// Present when the result set is empty ("Result set was empty")
    #[serde(default)]
    error: Option<String>,
    #[serde(rename = "dc:title", default)]
    title: Option<String>,
    #[serde(rename = "dc:creator", default)]
    creator: Option<String>,
    #[serde(rename = "prism:publicationName", default)]
    publication_name: Option<String>,
    #[serde(rename = "prism:coverDate", default)]
    cover_date: Option<String>,
    #[serde(rename = "prism:doi", default)]
    doi: Option<String>,
    #[serde(rename = "subtypeDescription", default)]
    subtype_description: Option<String>,
    #[serde(rename = "citedby-count", default)]
    citedby_count: Option<String>,
}

/// Map response entries to publication records, dropping error entries.
fn records_from_response(response: SearchResponse) -> Vec<PublicationRecord> {
    response
        .search_results
        .entry
        .into_iter()
        .filter(|e| {
            if let Some(ref err) = e.error {
                debug!(error = %err, "Scopus returned an error entry");
                false
            } else {
                true
            }
        })
        .map(entry_to_record)
        .collect()
}

/// Convert one Scopus entry to a [`PublicationRecord`].
///
/// The year is the leading `YYYY` of `prism:coverDate`; unparseable year or
/// cited-by values become `None` so the aggregator can skip them per field.
fn entry_to_record(entry: SearchEntry) -> PublicationRecord {
    let year = entry
        .cover_date
        .as_deref()
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse().ok());

    let cited_by = entry
        .citedby_count
        .as_deref()
        .and_then(|c| c.trim().parse().ok());

    PublicationRecord {
        title: entry.title.unwrap_or_default(),
        authors: entry.creator.unwrap_or_default(),
        year,
        source_title: entry.publication_name.unwrap_or_default(),
        document_type: entry.subtype_description.unwrap_or_default(),
        cited_by,
        doi: entry.doi.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_to_record_maps_fields() {
        let entry = SearchEntry {
            title: Some("Deferiprone in PD".to_string()),
            creator: Some("Doe J.".to_string()),
            publication_name: Some("J. Neurochem.".to_string()),
            cover_date: Some("2020-06-15".to_string()),
            doi: Some("10.1000/xyz".to_string()),
            subtype_description: Some("Article".to_string()),
            citedby_count: Some("17".to_string()),
            ..Default::default()
        };
        let record = entry_to_record(entry);
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.cited_by, Some(17));
        assert_eq!(record.source_title, "J. Neurochem.");
        assert_eq!(record.document_type, "Article");
    }

    #[test]
    fn test_entry_with_bad_numbers_maps_to_none() {
        let entry = SearchEntry {
            cover_date: Some("n.d.".to_string()),
            citedby_count: Some("unknown".to_string()),
            ..Default::default()
        };
        let record = entry_to_record(entry);
        assert_eq!(record.year, None);
        assert_eq!(record.cited_by, None);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "search-results": {
                "opensearch:totalResults": "2",
                "entry": [
                    {
                        "dc:title": "Paper one",
                        "dc:creator": "Doe J.",
                        "prism:publicationName": "J1",
                        "prism:coverDate": "2021-01-01",
                        "subtypeDescription": "Article",
                        "citedby-count": "5"
                    },
                    {
                        "dc:title": "Paper two",
                        "prism:coverDate": "2019-11-30",
                        "subtypeDescription": "Review",
                        "citedby-count": "0"
                    }
                ]
            }
        }"#;
        let response: SearchResponse = serde_json::from_str(json).expect("valid response");
        assert_eq!(response.search_results.total_results.as_deref(), Some("2"));
        let records = records_from_response(response);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2021));
        assert_eq!(records[1].document_type, "Review");
        assert_eq!(records[1].cited_by, Some(0));
    }

    #[test]
    fn test_empty_result_set_entry_yields_no_records() {
        let json = r#"{
            "search-results": {
                "opensearch:totalResults": "0",
                "entry": [ { "error": "Result set was empty" } ]
            }
        }"#;
        let response: SearchResponse = serde_json::from_str(json).expect("valid response");
        assert!(records_from_response(response).is_empty());
    }

    #[test]
    fn test_missing_entry_array_yields_no_records() {
        let json = r#"{ "search-results": { "opensearch:totalResults": "0" } }"#;
        let response: SearchResponse = serde_json::from_str(json).expect("valid response");
        assert!(records_from_response(response).is_empty());
    }
}
