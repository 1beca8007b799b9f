use serde::{Deserialize, Serialize};

pub fn default_port() -> u16 {
    8080
}

/// One route entry from the configuration file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteDeclaration {
    pub method: String,
    pub route: String,
    pub response_file: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,
}
