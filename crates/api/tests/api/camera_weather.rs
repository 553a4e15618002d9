use crate::helpers::{spawn_app, MockObservations};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use hyper::{header, Method};
use serde_json::{json, Value};
use smokeynet_api::{FetchError, RawObservation, Variable};
use std::sync::Arc;
use tower::ServiceExt;

async fn get_json(app: axum::Router, uri: &str) -> (u16, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.expect("Failed to execute request.");
    let status = response.status().as_u16();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64().expect("numeric value");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn root_returns_greeting() {
    let test_app = spawn_app(Arc::new(MockObservations::new()));
    let (status, body) = get_json(test_app.app, "/").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"Hello": "Mundo"}));
}

#[tokio::test]
async fn unknown_camera_returns_empty_data() {
    let mut observations = MockObservations::new();
    observations.expect_fetch_latest().times(0);
    let test_app = spawn_app(Arc::new(observations));

    let (status, body) = get_json(test_app.app, "/camera/weatherdata/not_a_camera").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"data": {}}));
}

#[tokio::test]
async fn no_recent_observations_returns_empty_data() {
    let mut observations = MockObservations::new();
    observations
        .expect_fetch_latest()
        .times(1)
        .returning(|_| Ok(vec![]));
    let test_app = spawn_app(Arc::new(observations));

    let (status, body) = get_json(test_app.app, "/camera/weatherdata/hpwren30_south").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"data": {}}));
}

#[tokio::test]
async fn upstream_failure_returns_empty_data() {
    let mut observations = MockObservations::new();
    observations
        .expect_fetch_latest()
        .times(1)
        .returning(|_| Err(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)));
    let test_app = spawn_app(Arc::new(observations));

    let (status, body) = get_json(test_app.app, "/camera/weatherdata/hpwren30_south").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"data": {}}));
}

#[tokio::test]
async fn returns_weighted_weather_for_every_variable() {
    let mut observations = MockObservations::new();
    observations
        .expect_fetch_latest()
        .withf(|ids| ids.len() == 2 && ids.contains(&String::from("SDG20")))
        .times(1)
        .returning(|_| {
            Ok(vec![
                RawObservation::new("SDG20")
                    .with(Variable::AirTemp, 60.0)
                    .with(Variable::RelativeHumidity, 30.0)
                    .with(Variable::WindSpeed, 10.0)
                    .with(Variable::WindDirection, 0.0),
                RawObservation::new("HPWR1")
                    .with(Variable::AirTemp, 70.0)
                    .with(Variable::WindGust, 14.0),
            ])
        });
    let test_app = spawn_app(Arc::new(observations));

    let (status, body) = get_json(test_app.app, "/camera/weatherdata/hpwren30_south").await;
    assert_eq!(status, 200);

    let data = body["data"].as_object().expect("data object");
    assert_eq!(data.len(), 8);
    assert_close(&data["air_temp_value_1"], 62.0);
    assert_close(&data["relative_humidity_value_1"], 30.0);
    assert_close(&data["wind_speed_value_1"], 10.0);
    assert_close(&data["wind_gust_value_1"], 14.0);
    assert_close(&data["wind_direction_value_1"], 0.0);
    assert!(data["dew_point_temperature_value_1d"].is_null());
    assert!(data["u"].as_f64().unwrap().abs() < 1e-9);
    assert_close(&data["v"], -10.0);
}

#[tokio::test]
async fn sole_station_at_max_distance_is_used_as_is() {
    let mut observations = MockObservations::new();
    observations
        .expect_fetch_latest()
        .times(1)
        .returning(|_| Ok(vec![RawObservation::new("SDG20").with(Variable::DewPoint, 41.5)]));
    let test_app = spawn_app(Arc::new(observations));

    let (_, body) = get_json(test_app.app, "/camera/weatherdata/hpwren30_north").await;
    assert_eq!(body["data"]["dew_point_temperature_value_1d"], json!(41.5));
    assert!(body["data"]["air_temp_value_1"].is_null());
}

#[tokio::test]
async fn api_docs_describe_weather_endpoint() {
    let test_app = spawn_app(Arc::new(MockObservations::new()));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/docs")
        .body(Body::empty())
        .unwrap();

    let response = test_app.app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("/camera/weatherdata/{camera_id}"));
}
