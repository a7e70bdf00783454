pub mod echo;
pub mod mock;
pub mod telemetry;

use actix_web::web;
use anyhow::Context;
use futures::future::LocalBoxFuture;
use post_request::{ReqwestPostClient, Spawner};
use std::time::Duration;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

use crate::echo::{EchoConfig, EchoStats};

pub struct EchoApp {
    pub port: u16,
    pub address: String,
    pub stats: web::Data<EchoStats>,
}

impl EchoApp {
    /// A client whose relative urls resolve against this server.
    pub fn client(&self) -> ReqwestPostClient {
        ReqwestPostClient::new(Some(self.address.clone()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.address)
    }

    /// POSTs the server has answered so far.
    pub fn posts(&self) -> usize {
        self.stats.posts()
    }
}

pub async fn spawn_echo_server_on_port(port: u16) -> anyhow::Result<EchoApp> {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    let mut config = EchoConfig {
        ip: "127.0.0.1".into(),
        port,
    };
    let stats = web::Data::new(EchoStats::default());

    let server = echo::build(&mut config, stats.clone())
        .context("failed to bind echo server")?;
    tokio::spawn(server);

    Ok(EchoApp {
        port: config.port,
        address: format!("http://127.0.0.1:{}", config.port),
        stats,
    })
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_echo_server() -> anyhow::Result<EchoApp> {
    spawn_echo_server_on_port(0).await
}

/// Spawns attempts onto the current `tokio::task::LocalSet`.
pub fn local_spawner() -> impl Spawner {
    |task: LocalBoxFuture<'static, ()>| {
        tokio::task::spawn_local(task);
    }
}

/// Give spawned local tasks a chance to run to their next await point.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Poll `condition` until it holds, failing after five seconds.
pub async fn wait_until(
    mut condition: impl FnMut() -> bool,
) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("condition not met within 5s");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}
