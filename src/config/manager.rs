use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

use super::resolver::{load_config, ConfigError};
use crate::fixture::FixtureStore;
use crate::http::router::{BuildError, RouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Everything produced by the build phase: the route table, the fixtures
/// behind it and the configured port.
pub struct ConfigManager {
    config_path: PathBuf,
    routes: Arc<RouteTable>,
    fixtures: FixtureStore,
    port: u16,
}

impl ConfigManager {
    /// Loads the configuration and every fixture it names.
    pub fn new(config_path: PathBuf) -> Result<Self, StartupError> {
        let root_folder = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let raw = load_config(&config_path)?;
        let mut fixtures = FixtureStore::new(root_folder);
        let routes = RouteTable::build(&raw.routes, &mut fixtures)?;

        Ok(ConfigManager {
            config_path,
            routes: Arc::new(routes),
            fixtures,
            port: raw.server_port,
        })
    }

    pub fn routes_handle(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routes)
    }

    pub fn fixtures(&self) -> &FixtureStore {
        &self.fixtures
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
