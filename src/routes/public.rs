use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::public::{QueueResponse, StationsResponse, StoriesResponse, StoryResponse},
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints that expose the current table state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/story", get(get_story))
        .route("/stations", get(get_stations))
        .route("/queue", get(get_queue))
        .route("/stories", get(list_stories))
}

#[utoipa::path(
    get,
    path = "/story",
    tag = "public",
    responses((status = 200, description = "Current story snapshot", body = StoryResponse))
)]
/// Return the story currently shown on the shared display.
pub async fn get_story(State(state): State<SharedState>) -> Json<StoryResponse> {
    Json(public_service::get_story(&state).await)
}

#[utoipa::path(
    get,
    path = "/stations",
    tag = "public",
    responses((status = 200, description = "Configured stations", body = StationsResponse))
)]
/// Return every station with its current render state.
pub async fn get_stations(State(state): State<SharedState>) -> Json<StationsResponse> {
    Json(public_service::get_stations(&state).await)
}

#[utoipa::path(
    get,
    path = "/queue",
    tag = "public",
    responses((status = 200, description = "Admission queue", body = QueueResponse))
)]
/// Return the admission queue in turn order.
pub async fn get_queue(State(state): State<SharedState>) -> Json<QueueResponse> {
    Json(public_service::get_queue(&state).await)
}

#[utoipa::path(
    get,
    path = "/stories",
    tag = "public",
    responses(
        (status = 200, description = "Persisted stories", body = StoriesResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Return the stories persisted so far.
pub async fn list_stories(
    State(state): State<SharedState>,
) -> Result<Json<StoriesResponse>, AppError> {
    let payload = public_service::list_stories(&state).await?;
    Ok(Json(payload))
}
