use std::sync::Arc;

use crate::config::Config;
use crate::render::RenderOptions;
use crate::structuring::CvStructurer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable structuring backend. Default: LlmStructurer.
    pub structurer: Arc<dyn CvStructurer>,
    pub render_options: RenderOptions,
}

impl AppState {
    pub fn new(config: Config, structurer: Arc<dyn CvStructurer>) -> Self {
        let render_options = config.render_options();
        Self {
            config,
            structurer,
            render_options,
        }
    }
}
