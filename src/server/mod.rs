pub mod api;
pub mod error;

use crate::config::{ AppConfig, TlsPaths };
use self::api::Backend;

use log::info;
use std::error::Error;
use std::net::SocketAddr;

pub struct Server {
    config: AppConfig,
    backend: Backend,
}

impl Server {
    pub fn new(config: AppConfig, backend: Backend) -> Self {
        Self { config, backend }
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = api::router(self.backend, &self.config.cors);

        match &self.config.tls {
            Some(TlsPaths { cert_path, key_path }) => {
                let addr = self.config.server_addr.parse::<SocketAddr>()?;
                info!(
                    "TLS enabled. Loading certificate from '{}' and key from '{}'",
                    cert_path,
                    key_path
                );
                let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                    cert_path,
                    key_path
                ).await?;

                info!("HTTPS server listening on: https://{}", addr);
                axum_server::bind_rustls(addr, tls_config)
                    .serve(app.into_make_service())
                    .await?;
            }
            None => {
                let listener = tokio::net::TcpListener::bind(&self.config.server_addr).await
                    .map_err(|e| format!("Failed to bind HTTP server to {}: {}", self.config.server_addr, e))?;
                info!("HTTP server listening on: http://{}", listener.local_addr()?);
                axum::serve(listener, app.into_make_service()).await?;
            }
        }

        Ok(())
    }
}
