pub mod check;
pub mod serve;

use fixtureserver::http::router::RouteTable;
use tracing::info;

/// Logs the registered routes, one line each.
fn log_routes(routes: &RouteTable) {
    for handler in routes.iter() {
        info!("Route: {} {}", handler.method, handler.path);
    }
}
