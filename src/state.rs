use std::sync::Arc;

use crate::backend::{HttpBackend, RecipeBackend};
use crate::config::AppConfig;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn RecipeBackend>,
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let backend = Arc::new(HttpBackend::new(&config)?) as Arc<dyn RecipeBackend>;
        let sessions = SessionStore::new(config.session_file.clone());
        Ok(Self {
            backend,
            config,
            sessions,
        })
    }
}
