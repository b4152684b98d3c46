use std::sync::Arc;

use crate::error::Result;
use tcms_dal::Pool;
use tcms_types::general::RuntimeEnv;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        AppState {
            state: Arc::new(AppStateInner { app_config, pool }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn build_url(&self, relative_url: &str) -> Result<Url> {
        let base = &self.config().base_url;
        let url = base.join(relative_url)?;
        Ok(url)
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    pub default_page_size: u32,
    pub environment: RuntimeEnv,
    /// Privileged credential is present, it is never kept here, just its presence
    pub service_role_configured: bool,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

/// Credential counts as configured only when set and non-empty
pub fn credential_present(value: Option<&str>) -> bool {
    value.map(|v| !v.is_empty()).unwrap_or(false)
}
