/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Read-only projections of the table and story state.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage reconnection supervisor.
pub mod storage_supervisor;
/// Serialized command dispatch into the turn coordinator.
pub mod turn_service;
