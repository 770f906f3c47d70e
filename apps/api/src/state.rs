use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::ImageGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Image model behind a trait so tests can run without Gemini. Default: GeminiClient.
    pub generator: Arc<dyn ImageGenerator>,
}

#[cfg(test)]
pub fn test_state(generator: Arc<dyn ImageGenerator>, output_dir: &std::path::Path) -> AppState {
    AppState {
        config: Config {
            gemini_api_key: "test-key".to_string(),
            gemini_base_url: "http://127.0.0.1:1".to_string(),
            output_dir: output_dir.to_path_buf(),
            port: 0,
            rust_log: "debug".to_string(),
        },
        generator,
    }
}
