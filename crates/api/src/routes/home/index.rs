use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Greeting {
    #[serde(rename = "Hello")]
    pub hello: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = OK, description = "Service is up", body = Greeting)
    ))]
pub async fn index_handler() -> Json<Greeting> {
    Json(Greeting {
        hello: String::from("Mundo"),
    })
}
