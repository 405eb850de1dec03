pub mod error;
pub mod routes;
pub mod state;
pub mod templates;

pub use routes::build_router;
pub use state::AppState;
