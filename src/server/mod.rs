//! Axum-based HTTP server layer.

mod handlers;
mod routes;

pub use handlers::{
    health_handler, xyz_tiles_handler, AppState, ErrorResponse, HealthResponse, ParameterEcho,
    XyzTilesQueryParams, XyzTilesResponse,
};
pub use routes::{create_router, RouterConfig};
