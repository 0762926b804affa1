use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod public;
pub mod sse;
pub mod station;
pub mod story;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(station::router())
        .merge(story::router())
        .merge(public::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
