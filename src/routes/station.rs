use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::{
        common::ActionResponse,
        station::{
            ClearTextRequest, FinishStoryRequest, LoginRequest, LogoutRequest, SubmitTextRequest,
        },
    },
    error::AppError,
    services::turn_service,
    state::{SharedState, coordinator::StationCommand},
};

/// Routes carrying station commands into the coordinator.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stations/{id}/participate", post(participate))
        .route("/stations/{id}/login", post(login))
        .route("/stations/{id}/login/cancel", post(cancel_login))
        .route("/stations/{id}/submit", post(submit_text))
        .route("/stations/{id}/skip", post(skip_turn))
        .route("/stations/{id}/clear", post(clear_text))
        .route("/stations/{id}/finish", post(finish_story))
        .route("/stations/{id}/logout", post(logout))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/participate",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "Queued for a turn", body = ActionResponse),
        (status = 409, description = "Already queued")
    )
)]
/// Ask for a writing turn on behalf of a station.
pub async fn participate(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(&state, StationCommand::Participate { station: id })
        .await
        .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("queued", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/login",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ActionResponse),
        (status = 401, description = "Credential rejected")
    )
)]
/// Resolve a pending login, as a guest or with stored credentials.
pub async fn login(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<LoginRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::login(&state, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("logged in", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/login/cancel",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    responses((status = 200, description = "Login dismissed", body = ActionResponse))
)]
/// Dismiss a pending login prompt, leaving the queue.
pub async fn cancel_login(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(&state, StationCommand::CancelLogin { station: id })
        .await
        .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("login cancelled", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/submit",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    request_body = SubmitTextRequest,
    responses(
        (status = 200, description = "Contribution accepted", body = ActionResponse),
        (status = 409, description = "Station does not hold the writing turn")
    )
)]
/// Submit the turn's text to the shared story.
pub async fn submit_text(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<SubmitTextRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(
        &state,
        StationCommand::SubmitText {
            station: id,
            text: payload.text,
        },
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("submitted", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/skip",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "Turn skipped", body = ActionResponse),
        (status = 409, description = "Station does not hold the writing turn")
    )
)]
/// Give up the writing turn without contributing.
pub async fn skip_turn(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(&state, StationCommand::SkipTurn { station: id })
        .await
        .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("turn skipped", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/clear",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    request_body = ClearTextRequest,
    responses((status = 200, description = "Draft discarded", body = ActionResponse))
)]
/// Record a discarded draft against the station's trashed counter.
pub async fn clear_text(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<ClearTextRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(
        &state,
        StationCommand::ClearText {
            station: id,
            discarded: payload.text,
        },
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("text cleared", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/finish",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    request_body = FinishStoryRequest,
    responses(
        (status = 200, description = "Story finished", body = ActionResponse),
        (status = 409, description = "Station does not hold the writing turn")
    )
)]
/// Close the active story with a final contribution.
pub async fn finish_story(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<FinishStoryRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(
        &state,
        StationCommand::FinishStory {
            station: id,
            text: payload.text,
        },
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("story finished", warnings)))
}

#[utoipa::path(
    post,
    path = "/stations/{id}/logout",
    tag = "station",
    params(("id" = String, Path, description = "Station identifier")),
    request_body = LogoutRequest,
    responses((status = 200, description = "Logged out", body = ActionResponse))
)]
/// Log the station's user out, persisting any unsaved draft first.
pub async fn logout(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<LogoutRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let warnings = turn_service::dispatch(
        &state,
        StationCommand::Logout {
            station: id,
            text: payload.text,
        },
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(ActionResponse::new("logged out", warnings)))
}
