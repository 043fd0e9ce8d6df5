pub mod event_task;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers to make them easily accessible
// to the binary that will build the web server router.
pub use middleware::{require_context, require_user};
pub use rest::{create_lesson_handler, dashboard_handler, enroll_handler, get_lesson_handler};
pub use ws_handler::ws_handler;
