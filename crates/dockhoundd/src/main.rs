//! dockhoundd - single-host authoritative DNS for Docker containers.
//!
//! Lists and follows the local Docker daemon, derives a DNS name per
//! container network attachment, and answers A/PTR queries for them over
//! paired UDP/TCP listeners. Also exposes an HTTP/JSON + WebSocket façade
//! over the live host table and writes a dnsmasq forwarder file on startup.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dockhound_core::HostStore;
use dockhound_dns::DnsEngine;
use dockhound_docker::{DockerClient, Ingestor};
use dockhoundd::{api, dnsmasq};

#[derive(Parser, Debug)]
#[command(name = "dockhoundd", author, about, long_about = None)]
struct Args {
    /// Address the DNS answer engine binds on, UDP and TCP both.
    #[arg(long, default_value = "0.0.0.0:53")]
    dns_bind: SocketAddr,

    /// Address the HTTP/WebSocket façade binds on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    http_bind: SocketAddr,

    /// Suffix appended to derived domain names. Read for parity with the
    /// original service's configuration surface; not substituted into name
    /// derivation, which always appends `docker`.
    #[arg(long, env = "LOCAL_DOMAIN", default_value = "docker")]
    local_domain: String,

    /// Skip writing the dnsmasq forwarder file at `/etc/dnsmasq.d/dnsdock`.
    #[arg(long)]
    no_dnsmasq: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `--version` is handled ahead of normal parsing so it prints a bare
    // version string, matching the original service's `--version` flag.
    if std::env::args().len() == 2 && std::env::args().nth(1).as_deref() == Some("--version") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), local_domain = %args.local_domain, "starting dockhoundd");

    if let Ok(host_ip) = std::env::var("HOST_IP") {
        tracing::info!(%host_ip, "HOST_IP set (informational only)");
    }

    if args.no_dnsmasq {
        tracing::info!("skipping dnsmasq forwarder file (--no-dnsmasq)");
    } else if let Err(error) = dnsmasq::write_default() {
        tracing::error!(%error, "could not write dnsmasq forwarder configuration");
    }

    let docker = DockerClient::connect()?;
    let store = HostStore::spawn();

    let dns_engine = DnsEngine::start(args.dns_bind, store.clone()).await?;

    let ingestor = Arc::new(Ingestor::new(docker, store.clone()));
    let ingestor_handle = tokio::spawn(Arc::clone(&ingestor).run());

    let http_listener = tokio::net::TcpListener::bind(args.http_bind).await?;
    let router = api::router(store);
    tracing::info!(addr = %args.http_bind, "HTTP/WebSocket façade listening");
    let http_handle = tokio::spawn(async move { axum::serve(http_listener, router).await });

    tokio::select! {
        () = shutdown_signal() => {
            tracing::info!("shutdown requested");
        }
        result = ingestor_handle => {
            match result {
                Ok(Err(error)) => tracing::error!(%error, "container ingestor exited"),
                Ok(Ok(())) => unreachable!("ingestor only returns on error"),
                Err(error) => tracing::error!(%error, "container ingestor task panicked"),
            }
        }
        result = http_handle => {
            match result {
                Ok(Err(error)) => tracing::error!(%error, "HTTP façade exited"),
                Ok(Ok(())) => tracing::error!("HTTP façade exited unexpectedly"),
                Err(error) => tracing::error!(%error, "HTTP façade task panicked"),
            }
        }
    }

    dns_engine.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            std::future::pending::<()>().await;
            return;
        };
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
