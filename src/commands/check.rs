use std::{error::Error, path::PathBuf};
use clap::Args;
use fixtureserver::{
    config::{manager::ConfigManager, resolver::get_config_path_cwd},
    filter::shape_name,
};
use tracing::info;

/// Load the config and every fixture, then exit.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Config file to validate
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    pub config: PathBuf,
}

pub async fn run(args: CheckArgs) -> Result<(), Box<dyn Error>> {
    let cfg = get_config_path_cwd(&args.config)?;
    info!(cfg = %cfg.display(), "checking configuration");

    let manager = ConfigManager::new(cfg)?;
    for fixture in manager.fixtures().fixtures() {
        info!(
            path = %fixture.path.display(),
            shape = shape_name(&fixture.document),
            "fixture ok"
        );
    }
    super::log_routes(&manager.routes_handle());

    info!(
        config = %manager.config_path().display(),
        routes = manager.routes_handle().len(),
        port = manager.port(),
        "configuration is valid"
    );
    Ok(())
}
