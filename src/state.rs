use std::sync::Arc;

use crate::config::ClientConfig;
use crate::gateway::{ApiGateway, HttpGateway, InMemoryGateway};
use crate::planner::Planner;
use crate::refresh::RefreshTask;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub gateway: Arc<dyn ApiGateway>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(ClientConfig::from_env()?);
        Self::from_config(config)
    }

    pub fn from_config(config: Arc<ClientConfig>) -> anyhow::Result<Self> {
        let gateway = if config.uses_memory_backend() {
            tracing::warn!("using in-memory meals backend; nothing is persisted");
            Arc::new(InMemoryGateway::new()) as Arc<dyn ApiGateway>
        } else {
            Arc::new(HttpGateway::new(&config.api_url)?) as Arc<dyn ApiGateway>
        };
        Ok(Self { config, gateway })
    }

    pub fn from_parts(config: Arc<ClientConfig>, gateway: Arc<dyn ApiGateway>) -> Self {
        Self { config, gateway }
    }

    pub fn planner(&self) -> Planner {
        Planner::new(self.gateway.clone())
    }

    /// Starts the periodic refresh for `planner` at the configured interval.
    pub fn spawn_refresh(&self, planner: &Planner) -> RefreshTask {
        RefreshTask::spawn(planner.stores().clone(), self.config.refresh_interval())
    }

    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(ClientConfig::default()),
            Arc::new(InMemoryGateway::new()),
        )
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[tokio::test]
    async fn fake_state_drives_a_planner() {
        let state = AppState::fake();
        let planner = state.planner();
        planner.load().await.expect("load");
        assert!(planner.stores().recipes.list().await.is_empty());
    }

    #[test]
    fn http_backend_requires_a_valid_url() {
        let config = Arc::new(ClientConfig {
            api_url: "::not-a-url".into(),
            ..Default::default()
        });
        assert!(AppState::from_config(config).is_err());
    }

    #[test]
    fn memory_url_selects_in_process_backend() {
        let config = Arc::new(ClientConfig {
            api_url: "memory".into(),
            ..Default::default()
        });
        assert!(AppState::from_config(config).is_ok());
    }
}
