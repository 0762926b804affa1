use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Story Weave Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::display_stream,
        crate::routes::sse::operator_stream,
        crate::routes::station::participate,
        crate::routes::station::login,
        crate::routes::station::cancel_login,
        crate::routes::station::submit_text,
        crate::routes::station::skip_turn,
        crate::routes::station::clear_text,
        crate::routes::station::finish_story,
        crate::routes::station::logout,
        crate::routes::story::set_story_name,
        crate::routes::public::get_story,
        crate::routes::public::get_stations,
        crate::routes::public::get_queue,
        crate::routes::public::list_stories,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::StationSummary,
            crate::dto::common::SessionStateDto,
            crate::dto::common::ActionResponse,
            crate::dto::station::LoginRequest,
            crate::dto::station::StoryNameRequest,
            crate::dto::public::StoryResponse,
            crate::dto::public::QueueResponse,
            crate::dto::public::StationsResponse,
            crate::dto::public::StoriesResponse,
            crate::dto::sse::OperatorHandshake,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "station", description = "Station command endpoints"),
        (name = "story", description = "Story naming and snapshots"),
        (name = "public", description = "Read-only projections"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
