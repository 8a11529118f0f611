//! HTTP binding for the request handler

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use log::{debug, info, error};
use crate::handler::{HandlerResponse, RequestHandler};

pub const GENERATE_PATH: &str = "/api/generate";
pub const HEALTH_PATH: &str = "/healthz";
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct Health { ok: bool, service: &'static str }

impl IntoResponse for HandlerResponse
{   fn into_response(self) -> Response
    {   let status = StatusCode::from_u16(self.status)
          .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body)
          .into_response()
    }
}

/// Routes every method to the handler so it can answer 405 itself
pub fn build_router(handler: RequestHandler) -> Router
{   Router::new()
      .route("/", any(proxy))
      .route(GENERATE_PATH, any(proxy))
      .route(HEALTH_PATH, get(health))
      .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
      .with_state(handler)
}

async fn proxy(
  State(handler): State<RequestHandler>
, method: Method
, body: Result<Bytes, BytesRejection>
) -> HandlerResponse
{   match body
    {   Ok(body) => {
          debug!("{} request, {} byte body", method, body.len());
          handler.handle(&method, &body).await
        }
      , Err(rejection) => {
          debug!("{} request, body rejected: {}", method, rejection);
          handler.reject(&method, rejection.into())
        }
    }
}

async fn health() -> Json<Health>
{   Json(Health { ok: true, service: env!("CARGO_PKG_NAME") })
}

/// Build the upstream client and serve until the process exits
pub async fn serve(config: crate::config::ProxyConfig)
  -> Result<(), crate::error::Error>
{   let client = crate::providers::GeminiClient::new(&config)?;
    let handler = RequestHandler::new(Arc::new(client));
    let app = build_router(handler);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
      .await
      .map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        crate::error::Error::InvalidConfiguration(
          format!("cannot bind {}: {}", addr, e)
        )
      })?;

    info!("listening on http://{}", addr);
    axum::serve(listener, app)
      .await
      .map_err(|e| {
        error!("Server error: {}", e);
        crate::error::Error::Other(e.to_string())
      })
}
