//! A small HTTP server that answers POSTs in predictable ways.
//!
//! Every endpoint lives under `/api`:
//! - `POST /echo` replies 200 with `{"received": <body>}`
//! - `POST /slow/{ms}` waits `ms` milliseconds, then echoes
//! - `POST /fail` replies 500 with a text body
//! - `POST /empty` replies 204 with no body
//! - `POST /text` replies 200 with a plain-text body
//!
//! Every POST is counted, whether or not its body parses.

use actix_cors::Cors;
use actix_web::dev::{HttpServiceFactory, Server};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, post, web};
use anyhow::Context;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const FAILURE_TEXT: &str = "echo server failure";
pub const PLAIN_TEXT: &str = "plain text reply";

pub struct EchoConfig {
    /// set to "0.0.0.0" for public access, "127.0.0.1" for local dev
    pub ip: String,
    /// set to 0 to get an os-assigned port
    pub port: u16,
}

impl EchoConfig {
    /// Reads `DEV_SERVER_IP` (default 127.0.0.1) and `DEV_SERVER_PORT`
    /// (default 8000).
    pub fn from_env() -> anyhow::Result<Self> {
        use std::env::var;

        let ip = var("DEV_SERVER_IP").unwrap_or_else(|_| "127.0.0.1".into());
        let port = match var("DEV_SERVER_PORT") {
            Ok(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid DEV_SERVER_PORT {port:?}"))?,
            Err(_) => 8000,
        };

        Ok(Self { ip, port })
    }
}

/// Counts requests that reached the echo endpoints.
#[derive(Debug, Default)]
pub struct EchoStats {
    posts: AtomicUsize,
}

impl EchoStats {
    pub fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.posts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build the server, but not await it.
///
/// Returns the port that the server has bound to by modifying the config.
pub fn build(
    config: &mut EchoConfig,
    stats: web::Data<EchoStats>,
) -> std::io::Result<Server> {
    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(format!("{}:{}", config.ip, config.port))?;
    config.port = listener.local_addr()?.port();

    let server = HttpServer::new(move || {
        App::new()
            // The ui is served from a different origin during development
            .wrap(Cors::permissive())
            .service(echo_services())
            .app_data(stats.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn echo_services() -> impl HttpServiceFactory {
    web::scope("/api")
        .service(health_check)
        .service(echo)
        .service(slow_echo)
        .service(fail)
        .service(empty)
        .service(text)
}

#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("healthy")
}

#[tracing::instrument(skip(stats, body))]
#[post("/echo")]
pub async fn echo(
    stats: web::Data<EchoStats>,
    body: web::Bytes,
) -> HttpResponse {
    stats.record();
    echo_response(&body)
}

#[tracing::instrument(skip(stats, body))]
#[post("/slow/{ms}")]
pub async fn slow_echo(
    stats: web::Data<EchoStats>,
    ms: web::Path<u64>,
    body: web::Bytes,
) -> HttpResponse {
    stats.record();
    actix_web::rt::time::sleep(Duration::from_millis(ms.into_inner())).await;
    echo_response(&body)
}

#[tracing::instrument(skip(stats))]
#[post("/fail")]
pub async fn fail(stats: web::Data<EchoStats>) -> HttpResponse {
    stats.record();
    HttpResponse::InternalServerError().body(FAILURE_TEXT)
}

#[tracing::instrument(skip(stats))]
#[post("/empty")]
pub async fn empty(stats: web::Data<EchoStats>) -> HttpResponse {
    stats.record();
    HttpResponse::NoContent().finish()
}

#[tracing::instrument(skip(stats))]
#[post("/text")]
pub async fn text(stats: web::Data<EchoStats>) -> HttpResponse {
    stats.record();
    HttpResponse::Ok().content_type("text/plain").body(PLAIN_TEXT)
}

fn echo_response(body: &[u8]) -> HttpResponse {
    match serde_json::from_slice::<Value>(body) {
        Ok(received) => {
            HttpResponse::Ok().json(json!({ "received": received }))
        }
        Err(e) => {
            HttpResponse::BadRequest().body(format!("invalid json: {e}"))
        }
    }
}
