//! The dashboard request orchestrator and its HTTP surface.
//!
//! Per request: resolve the effective SQL (canned selection → submitted text
//! → query string → session memory), execute it exactly once, paginate the
//! rows, project the chart payload, and assemble the response model. The
//! axum layer underneath handles routing, form/query extraction, and the
//! session cookie.

use crate::chart::{self, ChartPayload};
use crate::db::{DatabaseClient, QueryOutput, Value};
use crate::paging::{paginate, parse_page_param, DEFAULT_PAGE_SIZE};
use crate::registry::QueryRegistry;
use crate::session::{SessionState, SessionStore, StoreSession};
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "dashboard_session";

/// Message shown when a statement executes without producing a result set.
pub const SUCCESS_MESSAGE: &str = "Query executed successfully.";

/// Request parameters accepted by the dashboard endpoint.
///
/// `sql_query` and `page` may arrive in a form body or the query string;
/// `canned_query` is honored from form submissions only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardParams {
    pub sql_query: Option<String>,
    pub canned_query: Option<String>,
    pub page: Option<String>,
}

/// One logical dashboard request, decoupled from the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    /// True for an explicit query submission (POST), false for a
    /// navigation/pagination request (GET).
    pub submission: bool,
    pub sql_query: Option<String>,
    pub canned_query: Option<String>,
    pub page: Option<String>,
}

impl DashboardRequest {
    /// Builds a submission request from form parameters.
    pub fn submission(params: DashboardParams) -> Self {
        Self {
            submission: true,
            sql_query: params.sql_query,
            canned_query: params.canned_query,
            page: params.page,
        }
    }

    /// Builds a navigation request from query-string parameters.
    ///
    /// Canned-query selection is a form-only input and is ignored here.
    pub fn navigation(params: DashboardParams) -> Self {
        Self {
            submission: false,
            sql_query: params.sql_query,
            canned_query: None,
            page: params.page,
        }
    }
}

/// Response model rendered for every dashboard request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardResponse {
    /// The rows of the requested page, values serialized to JSON.
    pub results: Vec<Vec<serde_json::Value>>,

    /// Column names, empty when there are no results.
    pub columns: Vec<String>,

    /// Execution failure text, verbatim from the database.
    pub error_message: Option<String>,

    /// Set when a statement executed without producing a result set.
    pub success_message: Option<String>,

    /// The effective SQL, echoed for redisplay.
    pub query: String,

    /// Chart payload derived from the current page, absent on failure.
    pub graph_data: Option<ChartPayload>,

    /// Chart-type hint. Only a canned-query selection ever sets this;
    /// free-form SQL leaves it empty.
    pub chart_type: Option<String>,

    /// 1-based page number of `results`.
    pub page: usize,

    /// Total number of pages.
    pub total_pages: usize,

    /// Names of the available canned queries, for the UI select box.
    pub canned_queries: Vec<&'static str>,
}

/// Runs one dashboard request end to end.
///
/// The effective SQL is executed at most once; a canned-query selection is
/// never re-executed by the free-form fallback path.
pub async fn run_dashboard(
    db: &dyn DatabaseClient,
    registry: &QueryRegistry,
    session: &mut dyn SessionState,
    request: DashboardRequest,
) -> DashboardResponse {
    let mut chart_type = None;

    // Resolve the effective SQL and page, in priority order: canned
    // selection, submitted text, query string, session memory.
    let (query, requested_page) = if request.submission {
        let mut query = request.sql_query.unwrap_or_default();

        if let Some(name) = request.canned_query.as_deref() {
            if let Some(producer) = registry.lookup(name) {
                let (sql, chart) = producer();
                query = sql;
                chart_type = Some(chart.as_str().to_string());
            }
        }

        // Persist unconditionally, canned or free-form, so pagination-only
        // requests re-run exactly what was submitted. A blank submission
        // overwrites too, clearing any earlier query.
        session.remember_query(&query);

        // A submission always restarts at page 1.
        (query, 1)
    } else {
        let query = request
            .sql_query
            .filter(|sql| !sql.is_empty())
            .or_else(|| session.last_query())
            .unwrap_or_default();

        (query, parse_page_param(request.page.as_deref()))
    };

    let mut response = DashboardResponse {
        query: query.clone(),
        chart_type,
        page: 1,
        total_pages: 1,
        canned_queries: registry.names(),
        ..Default::default()
    };

    // No SQL resolved: render the empty state, neither success nor error.
    if query.is_empty() {
        return response;
    }

    match db.execute_query(&query).await {
        Err(e) => {
            debug!("Query failed: {}", e);
            response.error_message = Some(e.message().to_string());
        }
        Ok(QueryOutput::NoResultSet) => {
            response.success_message = Some(SUCCESS_MESSAGE.to_string());
        }
        Ok(QueryOutput::ResultSet(result)) => {
            response.columns = result.column_names();
            let page = paginate(result.rows, requested_page, DEFAULT_PAGE_SIZE);
            response.graph_data = Some(chart::project(&page.rows));
            response.results = page
                .rows
                .iter()
                .map(|row| row.iter().map(Value::to_json).collect())
                .collect();
            response.page = page.number;
            response.total_pages = page.total_pages;
        }
    }

    response
}

/// Shared state for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseClient>,
    pub registry: Arc<QueryRegistry>,
    pub sessions: Arc<SessionStore>,
}

/// Builds the dashboard router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard_get).post(dashboard_post))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn dashboard_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DashboardParams>,
) -> Response {
    handle(state, headers, DashboardRequest::navigation(params)).await
}

async fn dashboard_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<DashboardParams>,
) -> Response {
    handle(state, headers, DashboardRequest::submission(params)).await
}

async fn handle(state: AppState, headers: HeaderMap, request: DashboardRequest) -> Response {
    let session_id =
        session_id_from_headers(&headers).unwrap_or_else(|| state.sessions.mint_id());
    let mut session = StoreSession::new(state.sessions.clone(), session_id);

    let body = run_dashboard(
        state.db.as_ref(),
        &state.registry,
        &mut session,
        request,
    )
    .await;

    // Re-issue the cookie on every response so pagination requests share
    // the submitting session.
    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly",
        session.session_id()
    );

    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    response
}

/// Extracts the session id from the request's Cookie header, if present.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        pair.strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::to_string)
    })
}
