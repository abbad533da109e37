use axum::extract::State;
use axum::Json;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::analyzer::crawler::{Crawler, FetchError};
use crate::analyzer::generator::{Summary, TestCase, TestCaseGenerator};
use crate::analyzer::parser;
use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::state::SharedState;

/// Simultaneous HEAD probes per analyze request.
const LINK_PROBE_CONCURRENCY: usize = 8;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub url: String,
    /// Path of the exported CSV report, served under /reports.
    pub report: String,
    pub summary: Summary,
    pub test_cases: Vec<TestCase>,
}

pub async fn analyze(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let url = parse_target_url(&req.url)?;

    tracing::info!(user_id = user.user_id, url = %url, "Analyzing page");

    let crawler = Crawler::new(url.clone(), &state.config.crawler)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let content = crawler.fetch_page().await.map_err(fetch_error_response)?;
    if content.trim().is_empty() {
        return Err(AppError::Unprocessable(
            "The website returned empty content.".to_string(),
        ));
    }

    // Parsing is synchronous; the scraper document never crosses an await
    let data = parser::parse(&content, &url);

    // Probes run a few at a time; `buffered` keeps results aligned with the
    // link order the generator zips against
    let probes: Vec<_> = data
        .links
        .iter()
        .map(|link| crawler.check_link(&link.url))
        .collect();
    let checks: Vec<_> = stream::iter(probes)
        .buffered(LINK_PROBE_CONCURRENCY)
        .collect()
        .await;

    let mut generator = TestCaseGenerator::new();
    generator.link_cases(&data.links, &checks);
    generator.form_cases(&data.forms);
    generator.structure_cases(&data.structure);
    generator.accessibility_cases(&data.structure);
    generator.language_cases(&data.structure);

    let summary = generator.summary();
    let filename = format!("test_cases_{}.csv", Uuid::now_v7());
    write_report(&state, &filename, &generator.to_csv()).await?;

    Ok(Json(AnalyzeResponse {
        url: url.to_string(),
        report: format!("/reports/{filename}"),
        summary,
        test_cases: generator.into_cases(),
    }))
}

fn parse_target_url(raw: &str) -> Result<Url, AppError> {
    let url: Url = raw.parse().map_err(|_| invalid_url())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid_url());
    }
    Ok(url)
}

fn invalid_url() -> AppError {
    AppError::BadRequest(
        "Invalid URL provided. Please enter a valid URL including http:// or https://".to_string(),
    )
}

fn fetch_error_response(err: FetchError) -> AppError {
    match err {
        FetchError::Timeout => AppError::GatewayTimeout(
            "The website took too long to respond. Please try again later.".to_string(),
        ),
        FetchError::Connect => {
            AppError::BadGateway("Could not establish a connection to the website.".to_string())
        }
        FetchError::Status(code) => AppError::BadGateway(format!(
            "Failed to fetch website content: server responded with status {code}"
        )),
        FetchError::Other(msg) => {
            AppError::BadGateway(format!("Failed to fetch website content: {msg}"))
        }
    }
}

async fn write_report(state: &SharedState, filename: &str, csv: &str) -> Result<(), AppError> {
    let dir = &state.config.reports_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create reports dir: {e}")))?;
    tokio::fs::write(dir.join(filename), csv)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write report: {e}")))?;
    Ok(())
}
