pub mod config;
pub mod error;
pub mod run;

use config::ServerConfig;
pub use error::{Error, Result};
use tcms_app::state::{AppConfig, AppState};
use tracing::info;

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let app_config: AppConfig = config.into();

    let data_dir = config.backend.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = tcms_dal::new_pool(&config.database_url()).await?;
    tcms_dal::migrate(&pool).await?;

    if !app_config.service_role_configured {
        info!("Privileged credential is not configured, delete operations are disabled");
    }
    Ok(AppState::new(app_config, pool))
}
