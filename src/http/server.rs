use std::{future::Future, io, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::{dispatcher::Dispatcher, handler::handle_client, router::RouteTable};

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
#[error("failed to bind {address}: {source}")]
pub struct ServeError {
    pub address: String,
    #[source]
    pub source: io::Error,
}

pub async fn run(address: &str, routes: Arc<RouteTable>) -> Result<(), ServeError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServeError {
            address: address.to_string(),
            source,
        })?;
    info!("Server listening on http://{}", address);

    serve(listener, routes).await;
    Ok(())
}

/// Waits for the next successful accept. Failures such as EMFILE or
/// ECONNABORTED are logged and retried after a short pause.
async fn accept_with_retry<T, F, Fut>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(conn) => return conn,
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
            }
        }
    }
}

/// Accepts connections on an already bound listener, one task per client.
pub async fn serve(listener: TcpListener, routes: Arc<RouteTable>) {
    let dispatcher = Dispatcher::new(routes);

    loop {
        let (stream, peer) = accept_with_retry(|| listener.accept()).await;
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, dispatcher).await {
                error!(%peer, "Error handling client: {}", e);
            }
        });
    }
}
