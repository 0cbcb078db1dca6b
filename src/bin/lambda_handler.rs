//! AWS Lambda handler serving the plan matching endpoints
//!
//! Accepts Lambda Function URL events and routes them through
//! [`MatchService`]. Configuration via environment variables:
//!   CATALOG_PATH   catalog directory (default: data/catalog)
//!   TABLES_PATH    scoring table directory (default: built-in tables)
//!   MAX_CANDIDATES largest candidate set scored per request
//!   MATCH_SEED     fixed perturbation seed for reproducible rankings

use anyhow::Context;
use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use plan_matcher::api::MatchService;
use plan_matcher::matching::{EngineConfig, DEFAULT_MAX_CANDIDATES};
use plan_matcher::plan::{load_catalog, loader::DEFAULT_CATALOG_PATH};
use plan_matcher::{MatchEngine, ScoringTables};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn build_service() -> anyhow::Result<MatchService> {
    let catalog_path = env::var("CATALOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH));
    let (catalog, rejected) = load_catalog(&catalog_path)
        .with_context(|| format!("loading catalog from {}", catalog_path.display()))?;
    if !rejected.is_empty() {
        log::warn!("{} catalog entries rejected at startup", rejected.len());
    }

    let tables = match env::var("TABLES_PATH") {
        Ok(dir) => ScoringTables::from_csv_path(Path::new(&dir))
            .with_context(|| format!("loading tables from {}", dir))?,
        Err(_) => ScoringTables::default_tables(),
    };

    let config = EngineConfig {
        max_candidates: env_parse("MAX_CANDIDATES").unwrap_or(DEFAULT_MAX_CANDIDATES),
        ..Default::default()
    };

    Ok(MatchService::new(
        Arc::new(catalog),
        MatchEngine::new(tables, config),
        env_parse("MATCH_SEED"),
    ))
}

/// Lambda handler function
async fn handler(
    service: Arc<MatchService>,
    event: LambdaEvent<LambdaFunctionUrlRequest>,
) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    let method = request
        .request_context
        .http
        .method
        .clone()
        .unwrap_or_else(|| "GET".to_string());
    let path = request
        .raw_path
        .clone()
        .or_else(|| request.request_context.http.path.clone())
        .unwrap_or_else(|| "/".to_string());

    let response = service.route(
        &method,
        &path,
        &request.query_string_parameters,
        request.body.as_deref(),
    );

    log::info!(
        "{} {} -> {} in {}ms",
        method,
        path,
        response.status,
        start.elapsed().as_millis()
    );

    Ok(LambdaFunctionUrlResponse {
        status_code: i64::from(response.status),
        headers: Default::default(),
        body: Some(response.body),
        is_base64_encoded: false,
        cookies: Vec::new(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let service = Arc::new(build_service()?);

    run(service_fn(move |event| {
        let service = Arc::clone(&service);
        async move { handler(service, event).await }
    }))
    .await
}
