// ABOUTME: Connection provider for the source and destination endpoints
// ABOUTME: Opens a tokio-postgres client over native TLS and spawns the connection task

use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Client;

use crate::error::{Error, Result};

/// Open a connection to `url` and spawn its background connection task.
///
/// The returned client is the sole handle; dropping it terminates the
/// connection. `allow_invalid_certs` relaxes TLS verification for endpoints
/// with self-signed certificates. `context` names the endpoint ("source",
/// "destination") in errors and logs.
pub async fn connect(url: &str, allow_invalid_certs: bool, context: &str) -> Result<Client> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(allow_invalid_certs)
        .build()
        .map_err(|e| Error::Configuration(format!("failed to build TLS connector: {}", e)))?;
    let tls = MakeTlsConnector::new(connector);

    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .map_err(|source| Error::Connection {
            context: context.to_string(),
            source,
        })?;

    let endpoint = context.to_string();
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            // A lost connection also fails the in-flight query on the
            // client side, which is where the run aborts from.
            tracing::debug!("{} connection task ended: {}", endpoint, e);
        }
    });

    Ok(client)
}
