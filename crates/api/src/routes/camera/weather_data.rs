use axum::{
    extract::{Path, State},
    Json,
};
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{AppState, CameraWeather};

/// Response envelope for camera weather.
///
/// `data` maps every variable name to its weighted value (or null), and is an
/// empty object when the camera is unknown or no station has a recent reading.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherDataResponse {
    #[schema(value_type = Object, example = json!({
        "air_temp_value_1": 62.0,
        "relative_humidity_value_1": 31.4,
        "wind_speed_value_1": 6.2,
        "wind_gust_value_1": null,
        "wind_direction_value_1": 225.0,
        "dew_point_temperature_value_1d": 33.2,
        "u": 4.38,
        "v": 4.38
    }))]
    pub data: CameraWeather,
}

#[utoipa::path(
    get,
    path = "/camera/weatherdata/{camera_id}",
    params(
        ("camera_id" = String, Path, description = "The camera station id to get weather data for."),
    ),
    responses(
        (status = OK, description = "Distance-weighted weather from the stations nearest the camera", body = WeatherDataResponse)
    ))]
pub async fn camera_weather_data(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
) -> Json<WeatherDataResponse> {
    debug!("weather data requested for camera {}", camera_id);
    let data = state.weather.camera_weather(&camera_id).await;
    Json(WeatherDataResponse { data })
}
