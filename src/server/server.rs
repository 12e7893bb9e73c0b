//! actix-web server construction

use crate::config::Config;
use crate::core::Orchestrator;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_cors::Cors;
use actix_web::dev::Service;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{web, App};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use uuid::Uuid;

/// The gateway HTTP server
pub struct HttpServer {
    state: AppState,
    listen: String,
}

impl HttpServer {
    /// Build the orchestrator and wrap it in a server
    pub fn new(config: Config) -> Result<Self> {
        let listen = config.server.listen.clone();
        let shared_config = Arc::new(config.clone());
        let orchestrator = Arc::new(Orchestrator::new(config)?);
        Ok(Self {
            state: AppState::new(shared_config, orchestrator),
            listen,
        })
    }

    /// Bind and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let state = self.state.clone();
        info!(listen = %self.listen, "starting gateway server");

        actix_web::HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state.clone()))
                .wrap(TracingLogger::default())
                .wrap(Cors::permissive())
                .wrap_fn(|req, srv| {
                    let fut = srv.call(req);
                    async move {
                        let mut res = fut.await?;
                        if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                            res.headers_mut()
                                .insert(HeaderName::from_static("x-request-id"), value);
                        }
                        Ok(res)
                    }
                })
                .configure(routes::configure)
        })
        .bind(&self.listen)?
        .run()
        .await?;
        Ok(())
    }
}
