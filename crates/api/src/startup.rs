use crate::{
    camera_weather_data, index_handler, routes, ObservationSource, StationLookup, StationMappings,
    SynopticClient, SynopticConfig, WeatherService,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use smokeynet_core::is_file;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::home::index_handler,
        routes::camera::camera_weather_data,
    ),
    components(
        schemas(
            routes::home::Greeting,
            routes::camera::WeatherDataResponse,
        )
    ),
    tags(
        (name = "smokeynet weather api", description = "a RESTful api giving distance-weighted current weather for wildfire cameras")
    )
)]
struct ApiDoc;

pub fn build_app_state(
    mapping_file: &str,
    synoptic: SynopticConfig,
) -> Result<AppState, anyhow::Error> {
    if !is_file(mapping_file) {
        return Err(anyhow!("station mapping file not found: {}", mapping_file));
    }
    let mappings = StationMappings::load(mapping_file)
        .map_err(|e| anyhow!("error loading station mappings: {}", e))?;
    info!(
        "loaded {} station mappings for {} cameras (max distance {} mi)",
        mappings.len(),
        mappings.camera_count(),
        mappings.max_distance()
    );

    let synoptic = SynopticClient::new(synoptic)
        .map_err(|e| anyhow!("error setting up synoptic client: {}", e))?;

    Ok(app_state(Arc::new(mappings), Arc::new(synoptic)))
}

pub fn app_state(
    stations: Arc<dyn StationLookup>,
    observations: Arc<dyn ObservationSource>,
) -> AppState {
    AppState {
        weather: Arc::new(WeatherService::new(stations, observations)),
    }
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/camera/weatherdata/{camera_id}", get(camera_weather_data))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
