//! Web layer for the isochrone engine.
//!
//! Provides HTTP endpoints for the loaded network and for isochrone queries,
//! answered as GeoJSON.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
