use std::sync::Arc;

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLBatchRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::graphql::CourseSchema;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub schema: CourseSchema,
    pub config: Arc<Config>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    message: &'static str,
    environment: String,
    graphql_endpoint: String,
    timestamp: String
}

/// Creates the application router: health check on `/`, GraphQL on the
/// configured path, CORS restricted to the configured origin.
pub fn create_app(state: AppState) -> anyhow::Result<Router> {
    let config = state.config.clone();

    let graphql_route = if config.enable_playground {
        get(graphql_playground).post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    let mut app = Router::new()
        .route("/", get(health_check))
        .route(&config.graphql_path, graphql_route)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let origin = HeaderValue::from_str(&config.cors_origin)
            .map_err(|_| anyhow::anyhow!("CORS_ORIGIN `{}` is not a valid header value", config.cors_origin))?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);
        app = app.layer(cors);
    }

    Ok(app)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        message: "EdTech API is running!",
        environment: state.config.environment.clone(),
        graphql_endpoint: state.config.graphql_path.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// Accepts a single operation or a JSON array of them.
async fn graphql_handler(State(state): State<AppState>, request: GraphQLBatchRequest) -> GraphQLResponse {
    state.schema.execute_batch(request.into_inner()).await.into()
}

async fn graphql_playground(State(state): State<AppState>) -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new(&state.config.graphql_path)))
}
