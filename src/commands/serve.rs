use std::{error::Error, path::PathBuf};
use clap::Args;
use fixtureserver::{
    config::{manager::ConfigManager, resolver::get_config_path_cwd},
    http::server,
};
use tracing::{info, warn};

/// Build the route table and serve it over HTTP.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Config file declaring the routes
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Port to listen on, overriding `server_port` from the config
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    let cfg = get_config_path_cwd(&args.config)?;
    info!(cfg = %cfg.display(), "serving configuration");

    let manager = ConfigManager::new(cfg)?;
    let routes = manager.routes_handle();
    if routes.is_empty() {
        warn!("no routes registered; every request will get 404");
    }
    super::log_routes(&routes);

    let port = args.port.unwrap_or(manager.port());
    let addr = format!("{}:{}", args.host, port);
    info!(%addr, "starting HTTP server");

    server::run(&addr, routes).await?;

    Ok(())
}
