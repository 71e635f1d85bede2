//! HTTP API handlers for lectern-dp

pub mod generation;
pub mod health;
pub mod sessions;
pub mod sse;
pub mod status;
pub mod upload;

pub use generation::generation_routes;
pub use health::health_routes;
pub use sessions::session_routes;
pub use sse::event_stream;
pub use status::status_routes;
pub use upload::upload_routes;
