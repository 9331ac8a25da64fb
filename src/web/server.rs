//! HTTP server assembly.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::auth::TokenCodec;
use crate::config::Config;
use crate::db::Database;

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// The assembled API server.
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Wire the application state from configuration and an open database.
    pub fn new(config: &Config, db: Database) -> Self {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .expect("invalid listen address");

        let codec = Arc::new(TokenCodec::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours * 3600,
        ));
        let state = Arc::new(AppState::new(db, codec, &config.auth.cookie_name));

        Self {
            addr,
            state,
            cors_origins: config.cors.origins.clone(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> axum::Router {
        create_router(self.state.clone(), &self.cors_origins).merge(create_health_router())
    }

    /// Bind and serve until shutdown.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("serving on http://{local_addr}");
        axum::serve(listener, router).await
    }

    /// Serve in the background and return the bound address. Used by tests
    /// binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("serving on http://{local_addr}");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("server error: {e}");
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_and_answers_health_check() {
        let mut config = Config::default();
        config.server.port = 0;

        let db = Database::open_in_memory().await.unwrap();
        let server = WebServer::new(&config, db);
        let addr = server.run_with_addr().await.unwrap();

        let stream = tokio::net::TcpStream::connect(addr).await;
        assert!(stream.is_ok());
    }
}
