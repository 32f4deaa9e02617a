//! API Routes
//!
//! Configures the Axum router with all fonts API endpoints.

use axum::{routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_fonts_handler, health_handler, license_handler, preview_handler, preview_multi_handler,
    providers_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /api/providers` - Registered font providers
/// - `GET /api/:provider/fonts/all` - Filtered font families
/// - `GET /api/:provider/fonts/preview` - PNG or base64 preview of one family
/// - `GET /api/:provider/fonts/preview/multi` - Base64 previews of several families
/// - `GET /api/:provider/fonts/license/:family` - License text of a family
///
/// # Middleware
/// - Panic recovery: a panicking handler becomes a 500
/// - Request id: `x-request-id` is generated when absent and echoed back
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health_handler))
        .route("/api/providers", get(providers_handler))
        .route("/api/:provider/fonts/all", get(all_fonts_handler))
        .route("/api/:provider/fonts/preview", get(preview_handler))
        .route("/api/:provider/fonts/preview/multi", get(preview_multi_handler))
        .route("/api/:provider/fonts/license/:family", get(license_handler))
        .with_state(state);

    with_middleware(routes)
}

/// Layers are listed innermost first.
fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CatchPanicLayer::new())
}
