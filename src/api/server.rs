//! HTTP server for the regroup API.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                           |
//! |--------|---------------|---------------------------------------|
//! | GET    | `/health`     | Health check                          |
//! | POST   | `/api/group`  | Group JSON records (body: records + config) |
//! | POST   | `/api/upload` | Upload a CSV file for grouping        |
//! | GET    | `/api/logs`   | SSE stream for real-time logs         |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, GroupRequest, GroupResponse};
use crate::config::GroupConfig;
use crate::group::pipeline::{group_csv_bytes, group_values};

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/group", post(group_json))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("regroup server running on http://localhost:{}", port);
    println!("   POST /api/group  - Group JSON records");
    println!("   POST /api/upload - Upload CSV file");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "regroup",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "group": "POST /api/group",
            "upload": "POST /api/upload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Group JSON records posted directly in the request body.
async fn group_json(
    Json(request): Json<GroupRequest>,
) -> Result<Json<GroupResponse>, (StatusCode, Json<Value>)> {
    let report = group_values(&request.records, &request.config).map_err(|e| {
        (StatusCode::BAD_REQUEST, Json(error_response(&e.to_string())))
    })?;

    Ok(Json(GroupResponse::from(report)))
}

/// Upload CSV endpoint. Expects a multipart form with a `file` part
/// and a `config` part holding the grouping configuration as JSON.
async fn upload_csv(
    mut multipart: Multipart,
) -> Result<Json<GroupResponse>, (StatusCode, Json<Value>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut config: Option<GroupConfig> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {}", e))),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            (
                                StatusCode::BAD_REQUEST,
                                Json(error_response(&format!("Read error: {}", e))),
                            )
                        })?
                        .to_vec(),
                );
            }
            "config" => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(error_response(&format!("Read error: {}", e))),
                    )
                })?;
                config = Some(GroupConfig::from_json(&text).map_err(|e| {
                    (StatusCode::BAD_REQUEST, Json(error_response(&e.to_string())))
                })?);
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("No file provided")),
        )
    })?;
    let config = config.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("No config provided")),
        )
    })?;

    let report = group_csv_bytes(&bytes, &config).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&e.to_string())),
        )
    })?;

    Ok(Json(GroupResponse::from(report)))
}
