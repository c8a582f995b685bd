use crate::config::Config;
use crate::directory::service::Directory;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Directory service over whichever store backend was configured.
    pub directory: Directory,
    pub config: Config,
}
