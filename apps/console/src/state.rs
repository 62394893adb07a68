use std::sync::Arc;

use crate::config::Config;
use crate::manager::ApplicationsService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the console's view state and the backend client.
    pub applications: Arc<ApplicationsService>,
    pub config: Config,
}
