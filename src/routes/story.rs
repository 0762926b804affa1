use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::{common::ActionResponse, station::StoryNameRequest},
    error::AppError,
    services::turn_service,
    state::{SharedState, coordinator::StationCommand},
};

/// Routes handling story naming.
pub fn router() -> Router<SharedState> {
    Router::new().route("/story/name", post(set_story_name))
}

#[utoipa::path(
    post,
    path = "/story/name",
    tag = "story",
    request_body = StoryNameRequest,
    responses(
        (status = 200, description = "Story name set", body = ActionResponse),
        (status = 400, description = "Empty story name"),
        (status = 409, description = "Story already created")
    )
)]
/// Supply the name the next created story will carry.
pub async fn set_story_name(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<StoryNameRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(
        &state,
        StationCommand::SetStoryName { name: payload.name },
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("story name set", warnings)))
}
