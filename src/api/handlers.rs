//! API Handlers
//!
//! HTTP request handlers for each fonts API endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::fonts::{preview::encode_base64, FontFamily, ResultType};
use crate::models::{
    FontsQuery, HealthResponse, ItemsResponse, PreviewQuery, ProviderResponse,
};
use crate::service::FontService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FontService>,
}

impl AppState {
    pub fn new(service: Arc<FontService>) -> Self {
        Self { service }
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/providers
pub async fn providers_handler(
    State(state): State<AppState>,
) -> Json<ItemsResponse<ProviderResponse>> {
    let items = state
        .service
        .providers()
        .iter()
        .map(|provider| ProviderResponse::from_provider(provider.as_ref()))
        .collect();

    Json(ItemsResponse::new(items))
}

/// Handler for GET /api/:provider/fonts/all
///
/// Lists cached families matching the filters, most popular first.
pub async fn all_fonts_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<FontsQuery>,
) -> Result<Json<ItemsResponse<FontFamily>>> {
    let provider = state.service.provider(&provider)?;
    let items = provider.fonts(&query.into_filters());

    Ok(Json(ItemsResponse::new(items)))
}

/// Handler for GET /api/:provider/fonts/preview
///
/// Renders the first requested family only.
pub async fn preview_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response> {
    let provider = state.service.provider(&provider)?;
    let selector = query.first_selector()?;

    let png = state
        .service
        .preview(provider.as_ref(), &selector, &query.text, query.small)
        .await?;

    let response = match query.result_type {
        ResultType::Png => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        ResultType::Base64 => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            encode_base64(&png),
        )
            .into_response(),
    };
    Ok(response)
}

/// Handler for GET /api/:provider/fonts/preview/multi
///
/// Renders every requested family concurrently into a map of base64 PNGs.
/// A family that fails to render maps to an empty string.
pub async fn preview_multi_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<BTreeMap<String, String>>> {
    if query.result_type == ResultType::Png {
        return Err(AppError::InvalidRequest(
            "resultType=png is not supported for multiple previews".to_string(),
        ));
    }

    let provider = state.service.provider(&provider)?;
    let text = Arc::new(query.text.clone());

    let mut tasks = JoinSet::new();
    for selector in query.selectors() {
        let service = Arc::clone(&state.service);
        let provider = Arc::clone(&provider);
        let text = Arc::clone(&text);
        let small = query.small;

        tasks.spawn(async move {
            let rendered = service
                .preview(provider.as_ref(), &selector, &text, small)
                .await;
            (selector.full_name(), rendered)
        });
    }

    let mut previews = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (name, rendered) = joined.map_err(|e| AppError::Internal(e.to_string()))?;
        let encoded = match rendered {
            Ok(png) => encode_base64(&png),
            Err(err) => {
                warn!(font = %name, error = %err, "Preview failed");
                String::new()
            }
        };
        previews.insert(name, encoded);
    }

    Ok(Json(previews))
}

/// Handler for GET /api/:provider/fonts/license/:family
pub async fn license_handler(
    State(state): State<AppState>,
    Path((provider, family)): Path<(String, String)>,
) -> Result<Response> {
    let provider = state.service.provider(&provider)?;
    let text = state.service.license(provider.as_ref(), &family).await?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}
