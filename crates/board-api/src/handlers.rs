//! Route handlers for the API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::boards::{BoardDefinition, ProcessingMode};
use crate::error::ApiError;
use crate::state::{AppState, RefreshOutcome};
use crate::types::{
    BoardListResponse, BoardQueryRequest, BoardQueryResponse, GroupResponse, HealthResponse,
    PageResponse,
};
use board_ingestion::DataSource;
use board_pipeline::{process, PipelineResult, Query, DEFAULT_GROUP_LABEL};

/// GET /health - Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /v1/boards - List known boards.
pub async fn list_boards<S: DataSource>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<BoardListResponse> {
    let boards: Vec<BoardDefinition> = state.registry.list().cloned().collect();
    Json(BoardListResponse {
        count: boards.len(),
        boards,
    })
}

/// POST /v1/boards/:board/query - Filter, sort, paginate and group a board.
pub async fn query_board<S: DataSource>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
    Json(body): Json<BoardQueryRequest>,
) -> Result<Json<BoardQueryResponse>, ApiError> {
    let board = state.board(&name)?;
    let query = build_query(board, &body);
    query.validate()?;

    let response = match board.mode {
        ProcessingMode::Server => query_upstream(&state, board, &query).await?,
        ProcessingMode::Local => {
            let records = state.snapshot(board).await?;
            let result = process(&records, &query)?;
            if result.page_was_clamped() {
                tracing::debug!(
                    "{}: page {} out of range, served page {}",
                    board.name,
                    result.requested_page,
                    result.effective_page
                );
            }
            local_response(board, &result)
        }
    };

    Ok(Json(response))
}

/// POST /v1/boards/:board/refresh - Re-fetch a local board's snapshot.
pub async fn refresh_board<S: DataSource>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let board = state.board(&name)?;
    let outcome = state.refresh(board).await?;
    Ok(Json(outcome))
}

/// Turn a request body into a pipeline query, applying board defaults.
fn build_query(board: &BoardDefinition, body: &BoardQueryRequest) -> Query {
    let mut query = Query::from_request(&body.request);
    if query.sort.is_empty() {
        if let Some(sort) = &board.default_sort {
            query.sort.push(sort.clone());
        }
    }
    if let Some(group) = &body.group_by {
        query = query.group_by(group.to_group_key());
    }
    query.default_group_label(
        body.default_group_label
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP_LABEL.to_string()),
    )
}

/// Forward the query upstream and group the returned page.
async fn query_upstream<S: DataSource>(
    state: &AppState<S>,
    board: &BoardDefinition,
    query: &Query,
) -> Result<BoardQueryResponse, ApiError> {
    let request = query.to_request()?;
    let page = state.source.fetch_page(&board.endpoint, &request).await?;

    // The upstream already filtered, sorted and paged; only group here.
    let grouping = Query {
        filters: Vec::new(),
        sort: Vec::new(),
        page: 1,
        per_page: page.data.len().max(1),
        ..query.clone()
    };
    let result = process(&page.data, &grouping)?;

    Ok(BoardQueryResponse {
        board: board.name.clone(),
        mode: board.mode,
        groups: result.groups.iter().map(GroupResponse::from).collect(),
        pagination: PageResponse {
            page: page.pagination.page,
            requested_page: query.page,
            per_page: query.per_page,
            total_count: None,
            total_pages: None,
            is_last_page: page.pagination.is_last_page,
        },
    })
}

fn local_response(board: &BoardDefinition, result: &PipelineResult<'_>) -> BoardQueryResponse {
    BoardQueryResponse {
        board: board.name.clone(),
        mode: board.mode,
        groups: result.groups.iter().map(GroupResponse::from).collect(),
        pagination: PageResponse {
            page: result.effective_page,
            requested_page: result.requested_page,
            per_page: result.per_page,
            total_count: Some(result.total_count),
            total_pages: Some(result.total_pages),
            is_last_page: result.effective_page >= result.total_pages,
        },
    }
}
