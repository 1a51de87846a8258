//! rustscopus - Scopus Boolean Search & Bibliometric Aggregation
//!
//! A Rust microservice that builds boolean Scopus queries from up to three
//! keywords, fetches one bounded page of results, exports them to CSV, and
//! prints the three summary charts (document types, publications per year,
//! top-10 cited sources).
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! rustscopus search deferiprone parkinson disease --op AND --op AND --api-key KEY
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! rustscopus serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use rustscopus::aggregate::{self, AggregateReport, YearRange};
use rustscopus::export;
use rustscopus::query::{self, Connector};
use rustscopus::record::PublicationRecord;
use rustscopus::scopus::{QueryOptions, ScopusClient, View};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Scopus Boolean Search & Bibliometric Aggregation - Rust Microservice
#[derive(Parser)]
#[command(name = "rustscopus")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Scopus and print the summary charts
    Search {
        /// Keyword slots, in order (up to 3)
        terms: Vec<String>,

        /// Boolean operator between adjacent keywords (repeatable: --op AND --op OR)
        #[arg(long = "op")]
        ops: Vec<String>,

        /// Scopus API key (falls back to SCOPUS_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Result-count limit (max 200)
        #[arg(long, default_value = "200")]
        count: usize,

        /// Result view mode: STANDARD or COMPLETE
        #[arg(long, default_value = "STANDARD")]
        view: String,

        /// Histogram range start year
        #[arg(long, default_value = "2000")]
        year_min: i32,

        /// Histogram range end year (inclusive)
        #[arg(long, default_value = "2025")]
        year_max: i32,

        /// Histogram bin count
        #[arg(long, default_value = "20")]
        bins: usize,

        /// Custom API base URL (mirror/proxy)
        #[arg(long)]
        base_url: Option<String>,

        /// Output directory for the CSV export
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Search {
            terms,
            ops,
            api_key,
            count,
            view,
            year_min,
            year_max,
            bins,
            base_url,
            output,
        } => {
            run_search_pipeline(
                terms, ops, api_key, count, view, year_min, year_max, bins, base_url, output,
            )
            .await
        }
        Commands::Serve { port, host } => run_server(host, port).await,
    }
}

// ============================================================================
// Search Pipeline
// ============================================================================

#[allow(clippy::too_many_arguments)]
async fn run_search_pipeline(
    terms: Vec<String>,
    ops: Vec<String>,
    api_key: Option<String>,
    count: usize,
    view: String,
    year_min: i32,
    year_max: i32,
    bins: usize,
    base_url: Option<String>,
    output_dir: PathBuf,
) -> Result<()> {
    let api_key = api_key
        .or_else(|| std::env::var("SCOPUS_API_KEY").ok())
        .context("Provide --api-key or set SCOPUS_API_KEY")?;

    let connectors = parse_connectors(&ops)?;
    let view: View = view.parse().map_err(anyhow::Error::msg)?;
    let range = YearRange::new(year_min, year_max)?;

    // ===========================================
    // STAGE 1: Query Construction
    // ===========================================
    println!("\n--- Stage 1: Query Construction ---");

    let term_refs: Vec<&str> = terms.iter().map(String::as_str).collect();
    let boolean_query = query::build(&term_refs, &connectors)?;
    println!("Query: {}", boolean_query);

    // ===========================================
    // STAGE 2: Scopus Search
    // ===========================================
    println!("\n--- Stage 2: Scopus Search ---");

    let client = ScopusClient::new(api_key)?;
    let options = QueryOptions { count, view, base_url };
    let records = client.search(&boolean_query, &options).await?;

    if records.is_empty() {
        println!("No results found.");
        return Ok(());
    }
    println!("Found {} results.", records.len());

    // Create output folder
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let safe_keyword: String = terms
        .join(" ")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_");
    let output_folder = output_dir.join(format!("{}_{}", timestamp, safe_keyword));
    std::fs::create_dir_all(&output_folder).context("Failed to create output directory")?;

    let csv_path = output_folder.join("scopus_results.csv");
    export::write_csv(&csv_path, &records)?;
    println!("Saved: {}", csv_path.display());

    // ===========================================
    // STAGE 3: Aggregation
    // ===========================================
    println!("\n--- Stage 3: Aggregation ---");

    let report = aggregate::aggregate_with_bins(&records, range, bins);

    print_report(&report, records.len());

    println!("\n✓ Pipeline complete. Results in: {}", output_folder.display());
    Ok(())
}

/// Parse `--op` selections into connectors
fn parse_connectors(ops: &[String]) -> Result<Vec<Connector>> {
    ops.iter()
        .map(|s| s.parse::<Connector>().map_err(anyhow::Error::msg))
        .collect()
}

/// Print the three summary charts plus the skipped-record warning
fn print_report(report: &AggregateReport, total: usize) {
    let type_rows: Vec<(String, u64)> = report
        .type_counts
        .iter()
        .map(|t| (t.document_type.clone(), t.count as u64))
        .collect();
    render_bar_chart("Document types", &type_rows);

    let hist = &report.year_histogram;
    let year_rows: Vec<(String, u64)> = hist
        .bins
        .iter()
        .map(|b| (format!("{:.1}-{:.1}", b.start, b.end), b.count as u64))
        .collect();
    render_bar_chart(
        &format!(
            "Publications per year ({}-{})",
            hist.range.min, hist.range.max
        ),
        &year_rows,
    );
    if hist.out_of_range > 0 {
        println!(
            "  ({} records outside {}-{} not shown)",
            hist.out_of_range, hist.range.min, hist.range.max
        );
    }

    let ranking_rows: Vec<(String, u64)> = report
        .citation_ranking
        .iter()
        .map(|s| (s.source_title.clone(), s.total_cited_by))
        .collect();
    render_bar_chart("Top 10 sources by citations", &ranking_rows);

    if report.skipped_records > 0 {
        warn!(
            skipped = report.skipped_records,
            total = total,
            "Records without a usable year were skipped in the histogram"
        );
        println!(
            "\n⚠ {} of {} records had no usable year and were skipped in the histogram.",
            report.skipped_records, total
        );
    }
}

/// Render one labeled bar chart to the terminal
fn render_bar_chart(title: &str, rows: &[(String, u64)]) {
    const BAR_WIDTH: u64 = 40;
    const LABEL_WIDTH: usize = 32;

    println!("\n{}", title);
    println!("{}", "-".repeat(title.len()));

    if rows.is_empty() {
        println!("(no data)");
        return;
    }

    let max = rows.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1);
    for (label, value) in rows {
        let mut label = label.clone();
        if label.chars().count() > LABEL_WIDTH {
            label = label.chars().take(LABEL_WIDTH - 1).collect::<String>() + "…";
        }
        let bar_len = (value * BAR_WIDTH / max) as usize;
        println!("{:<LABEL_WIDTH$} {:>6} {}", label, value, "█".repeat(bar_len));
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(host: String, port: u16) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    let app_state = Arc::new(AppState::default());

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/search/csv", post(search_csv_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

#[derive(Default)]
struct AppState {
    // Add shared state here (e.g., rate limiters, caches)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Search request body
#[derive(Debug, Deserialize)]
struct SearchRequest {
    terms: Vec<String>,
    #[serde(default)]
    connectors: Vec<String>,
    api_key: String,
    #[serde(default = "default_count")]
    count: usize,
    #[serde(default)]
    view: Option<String>,
    #[serde(default)]
    year_min: Option<i32>,
    #[serde(default)]
    year_max: Option<i32>,
}

fn default_count() -> usize {
    200
}

/// Search response
#[derive(Debug, Serialize)]
struct SearchResponse {
    status: String,
    query: Option<String>,
    count: usize,
    records: Vec<PublicationRecord>,
    report: Option<AggregateReport>,
}

impl SearchResponse {
    fn failure(message: String) -> Self {
        Self {
            status: format!("error: {}", message),
            query: None,
            count: 0,
            records: vec![],
            report: None,
        }
    }
}

/// Build the query and run the bounded search for a server request.
///
/// Returns an error message suitable for the response body.
async fn run_search(
    req: &SearchRequest,
) -> std::result::Result<(String, Vec<PublicationRecord>), String> {
    let connectors = parse_connectors(&req.connectors).map_err(|e| e.to_string())?;

    let term_refs: Vec<&str> = req.terms.iter().map(String::as_str).collect();
    let boolean_query = query::build(&term_refs, &connectors).map_err(|e| e.to_string())?;

    let view = req.view.as_deref().unwrap_or("STANDARD").parse::<View>()?;

    let client = ScopusClient::new(req.api_key.clone()).map_err(|e| e.to_string())?;
    let options = QueryOptions {
        count: req.count,
        view,
        base_url: None,
    };

    let records = client.search(&boolean_query, &options).await.map_err(|e| {
        error!(error = %e, "Search failed");
        e.to_string()
    })?;

    Ok((boolean_query.to_string(), records))
}

/// Search endpoint handler
async fn search_handler(
    State(_state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    info!(terms = ?req.terms, connectors = ?req.connectors, "Search request");

    let (query_str, records) = match run_search(&req).await {
        Ok(found) => found,
        Err(e) => return Json(SearchResponse::failure(e)),
    };

    let default_range = YearRange::default();
    let range = match YearRange::new(
        req.year_min.unwrap_or(default_range.min),
        req.year_max.unwrap_or(default_range.max),
    ) {
        Ok(r) => r,
        Err(e) => return Json(SearchResponse::failure(e.to_string())),
    };

    let report = aggregate::aggregate(&records, range);
    Json(SearchResponse {
        status: "success".to_string(),
        query: Some(query_str),
        count: records.len(),
        records,
        report: Some(report),
    })
}

/// Search endpoint returning the result set as a CSV download
async fn search_csv_handler(
    State(_state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Response {
    info!(terms = ?req.terms, "CSV search request");

    let (_, records) = match run_search(&req).await {
        Ok(found) => found,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };

    match export::to_csv_bytes(&records) {
        Ok(bytes) => csv_response(bytes),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Wrap CSV bytes as a file-download response
fn csv_response(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"scopus_results.csv\"",
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_response_is_a_download() {
        let records = vec![PublicationRecord {
            title: "Paper one".to_string(),
            year: Some(2020),
            ..Default::default()
        }];
        let bytes = export::to_csv_bytes(&records).expect("serialize");
        let response = csv_response(bytes);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        assert_eq!(content_type, Some("text/csv"));

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(disposition.contains("scopus_results.csv"));
    }

    #[test]
    fn test_parse_connectors_rejects_unknown_operator() {
        assert!(parse_connectors(&["AND".to_string(), "NEAR".to_string()]).is_err());
        let ops = parse_connectors(&["and".to_string(), "OR".to_string()]).expect("valid ops");
        assert_eq!(ops, vec![Connector::And, Connector::Or]);
    }
}
