use crate::registry::ViewerRegistry;
use crate::session::SessionService;
use std::sync::Arc;

/// Shared application state for HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SessionService>,
    pub registry: Arc<ViewerRegistry>,
    /// Base for advertised WebSocket URLs, e.g. `ws://127.0.0.1:8000`.
    pub ws_base: String,
}

impl AppState {
    pub fn new(service: Arc<SessionService>, registry: Arc<ViewerRegistry>, ws_base: String) -> Self {
        Self {
            service,
            registry,
            ws_base,
        }
    }
}
