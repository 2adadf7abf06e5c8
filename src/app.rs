#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::dataset::{DatasetSummary, SalesDataset, SalesFilter};
use crate::downloader;
use crate::error::{DatasetError, ExportError, GenerateError, GridConfigError};
use crate::generator::{GeneratorConfig, SampleDataGenerator, validate_count};
use crate::grid::{ExportFormat, GridOptions, GridQuery};
use crate::market::{LISTINGS, MarketDataGenerator, StockQuote};
use crate::record::{Amount, Category};

/// Read-only state shared by all requests. Each request builds its own RNG.
pub struct AppState {
    config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Generator for one request. Without a pinned anchor the dates end today, so a
    /// long-running server keeps following the calendar.
    fn sales(&self) -> SampleDataGenerator {
        match self.config.anchor_date {
            Some(anchor) => SampleDataGenerator::new(GeneratorConfig::anchored_at(anchor)),
            None => SampleDataGenerator::default(),
        }
    }
}

/// `Query` whose rejection is reported with the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
struct ApiQuery<T>(T);

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    rows: Option<i64>,
    seed: Option<u64>,
    category: Option<String>,
    min_amount: Option<f64>,
    /// `aggregations` serves the first rows of the aggregation demo dataset
    demo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
    rows: Option<i64>,
    seed: Option<u64>,
    category: Option<String>,
    min_amount: Option<f64>,
    demo: Option<String>,
    /// Comma separated row indices picked in the grid
    selected: Option<String>,
}

impl ExportQuery {
    fn data(&self) -> DataQuery {
        DataQuery {
            rows: self.rows,
            seed: self.seed,
            category: self.category.clone(),
            min_amount: self.min_amount,
            demo: self.demo.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FinanceQuery {
    stocks: Option<i64>,
    seed: Option<u64>,
}

#[derive(Serialize)]
struct SalesResponse {
    records: SalesDataset,
    summary: DatasetSummary,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

/// Everything a handler can fail with, mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Grid(#[from] GridConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("request failed: {}", self);
        } else {
            info!("rejected request: {}", self);
        }

        let body = StatusResponse {
            status: "error".to_string(),
            message: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router; split from [`run`] so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(serve_index))
        .route("/api/sales", get(get_sales))
        .route("/api/summary", get(get_summary))
        .route("/api/finance", get(get_finance))
        .route("/api/grid-options", get(get_grid_options))
        .route("/api/export", get(export_sales))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;

    // Setup app state
    let app_state = Arc::new(AppState::new(config));
    let app = router(app_state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

fn load_dataset(state: &AppState, query: &DataQuery) -> Result<SalesDataset, AppError> {
    let rows = query.rows.unwrap_or(state.config.default_rows);
    if rows > state.config.max_rows {
        return Err(AppError::BadRequest(format!(
            "at most {} rows can be generated, asked for {}",
            state.config.max_rows, rows
        )));
    }

    let seed = query.seed.unwrap_or(state.config.seed);
    let dataset = match query.demo.as_deref() {
        Some("aggregations") => {
            let rows = validate_count("rows", rows)?;
            state.sales().aggregation_demo_data(Some(seed))?.head(rows)
        }
        _ => state.sales().generate(rows, Some(seed))?,
    };

    let filter = SalesFilter {
        category: query
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::parse::<Category>)
            .transpose()
            .map_err(AppError::BadRequest)?,
        min_total_amount: query
            .min_amount
            .filter(|min| *min > 0.0)
            .map(Amount::from_f64),
    };

    if filter.is_empty() {
        Ok(dataset)
    } else {
        Ok(dataset.filtered(&filter))
    }
}

async fn get_sales(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<DataQuery>,
) -> Result<Json<SalesResponse>, AppError> {
    let records = load_dataset(&state, &params)?;
    let summary = records.summary();
    Ok(Json(SalesResponse { records, summary }))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<DataQuery>,
) -> Result<Json<DatasetSummary>, AppError> {
    Ok(Json(load_dataset(&state, &params)?.summary()))
}

async fn get_finance(
    ApiQuery(params): ApiQuery<FinanceQuery>,
) -> Result<Json<Vec<StockQuote>>, AppError> {
    let stocks = params.stocks.unwrap_or(LISTINGS.len() as i64);
    let quotes = MarketDataGenerator::default().generate(stocks, params.seed)?;
    Ok(Json(quotes))
}

async fn get_grid_options(
    ApiQuery(params): ApiQuery<GridQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let options = GridOptions::from_query(&params)?;
    Ok(Json(serde_json::json!({
        "theme": options.theme.class_name(),
        "height": options.height,
        "gridOptions": options.to_grid_options(),
    })))
}

async fn export_sales(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ExportQuery>,
) -> Result<Response, AppError> {
    let format = params
        .format
        .as_deref()
        .map(str::parse::<ExportFormat>)
        .transpose()?
        .unwrap_or_default();

    let mut dataset = load_dataset(&state, &params.data())?;
    let selected = params.selected.as_deref().filter(|s| !s.trim().is_empty());
    if let Some(selected) = selected {
        dataset = dataset.select(&parse_indices(selected)?)?;
    }

    let mut file = downloader::export(&dataset, format)?;
    if selected.is_some() {
        file.file_name = format!("selected_rows.{}", format.extension());
    }

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

fn parse_indices(raw: &str) -> Result<Vec<usize>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| AppError::BadRequest(format!("invalid row index: {}", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::AGGREGATION_DEMO_ROWS;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::NaiveDate;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::new(AppConfig {
            anchor_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            ..Default::default()
        })))
    }

    async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
        send(app(), uri).await
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn sales_endpoint_is_reproducible() {
        let (status, first) = get_json("/api/sales?rows=5&seed=42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["records"].as_array().unwrap().len(), 5);
        assert_eq!(first["summary"]["totalOrders"], 5);

        let (_, second) = get_json("/api/sales?rows=5&seed=42").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn default_size_comes_from_config() {
        let (_, body) = get_json("/api/summary").await;
        assert_eq!(body["totalOrders"], 500);
    }

    #[tokio::test]
    async fn category_filter_applies() {
        let (status, body) = get_json("/api/sales?rows=300&category=Storage").await;
        assert_eq!(status, StatusCode::OK);
        let records = body["records"].as_array().unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r["category"] == "Storage"));
    }

    #[tokio::test]
    async fn bad_requests_are_400_with_message() {
        for uri in [
            "/api/sales?rows=-1",
            "/api/sales?rows=20000",
            "/api/sales?category=Groceries",
            "/api/grid-options?group_by=quantity",
            "/api/export?format=pdf",
            "/api/export?rows=3&selected=7",
            "/api/sales?seed=",
            "/api/sales?rows=abc",
            "/api/finance?stocks=many",
            "/api/grid-options?height=tall",
        ] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["status"], "error");
            assert!(body["message"].as_str().is_some());
        }
    }

    #[tokio::test]
    async fn grid_options_render() {
        let (status, body) =
            get_json("/api/grid-options?group_by=Category&theme=material&page_size=20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "ag-theme-material");
        assert_eq!(body["gridOptions"]["paginationPageSize"], 20);
    }

    #[tokio::test]
    async fn csv_export_of_selected_rows() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/export?format=csv&rows=10&seed=1&selected=0,3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"selected_rows.csv\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn finance_endpoint() {
        let (status, body) = get_json("/api/finance?stocks=5&seed=42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn index_page_is_served() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("ag-grid"));
    }

    #[tokio::test]
    async fn aggregation_demo_rows_are_a_prefix() {
        let (_, full) = get_json(&format!(
            "/api/sales?demo=aggregations&rows={}&seed=42",
            AGGREGATION_DEMO_ROWS
        ))
        .await;
        let (status, short) = get_json("/api/sales?demo=aggregations&rows=20&seed=42").await;
        assert_eq!(status, StatusCode::OK);

        let full = full["records"].as_array().unwrap();
        let short = short["records"].as_array().unwrap();
        assert_eq!(full.len(), 500);
        assert_eq!(short.as_slice(), &full[..20]);
    }

    #[tokio::test]
    async fn unpinned_server_dates_follow_today() {
        let before = chrono::Local::now().date_naive();
        let app = router(Arc::new(AppState::new(AppConfig::default())));
        let (status, body) = send(app, "/api/summary?rows=300").await;
        let after = chrono::Local::now().date_naive();
        assert_eq!(status, StatusCode::OK);

        let summary: Value = serde_json::from_slice(&body).unwrap();
        let first: NaiveDate = summary["firstDate"].as_str().unwrap().parse().unwrap();
        let last: NaiveDate = summary["lastDate"].as_str().unwrap().parse().unwrap();
        assert!(last <= after);
        assert!(first >= before - chrono::Duration::days(365));
    }
}
