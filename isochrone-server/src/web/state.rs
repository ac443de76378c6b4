//! Application state for the web layer.

use std::sync::Arc;

use crate::isochrone::IsochroneEngine;

/// Shared application state.
///
/// Cloned into every handler; the engine itself is shared.
#[derive(Clone)]
pub struct AppState {
    /// Isochrone engine over the loaded network
    pub engine: Arc<IsochroneEngine>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: IsochroneEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
