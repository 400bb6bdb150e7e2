//! bucketfs server - a minimal S3-compatible gateway over a local
//! filesystem.
//!
//! Serves one directory subtree per bucket, with SigV2-style request
//! authentication and virtual-hosted or path-style addressing.
//!
//! # Usage
//!
//! ```text
//! DATA_DIR=/srv/buckets GATEWAY_CREDENTIALS=mybucket:AKID:secret bucketfs-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:9000` | Bind address |
//! | `DATA_DIR` | `/var/lib/bucketfs` | Root of the bucket tree |
//! | `VIRTUAL_HOSTING` | `true` | Enable virtual-hosted-style addressing |
//! | `VIRTUAL_HOST_SUFFIX` | `s3.localhost` | Virtual hosting domain |
//! | `SKIP_SIGNATURE_VALIDATION` | `false` | Skip signature verification |
//! | `MAX_CLOCK_SKEW_SECS` | `180` | Allowed request clock skew |
//! | `GATEWAY_CREDENTIALS` | *(unset)* | `bucket:akid:secret[,...]` triples |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bucketfs_auth::StaticCredentialProvider;
use bucketfs_core::{Gateway, GatewayConfig};
use bucketfs_http::dispatch::GatewayHandler;
use bucketfs_http::service::{GatewayHttpService, HttpConfig};

use crate::handler::FsHandler;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config
/// value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the [`HttpConfig`] from the application [`GatewayConfig`].
fn build_http_config(
    config: &GatewayConfig,
    credential_provider: Option<Arc<dyn bucketfs_auth::CredentialProvider>>,
) -> HttpConfig {
    HttpConfig {
        virtual_host_suffix: config.virtual_host_suffix.clone(),
        virtual_hosting: config.virtual_hosting,
        skip_signature_validation: config.skip_signature_validation,
        max_clock_skew_secs: config.max_clock_skew_secs,
        credential_provider,
    }
}

/// Parse the `GATEWAY_CREDENTIALS` environment variable into a credential
/// provider.
///
/// Format: comma-separated `bucket:access_key_id:secret_key` triples.
fn build_credential_provider() -> Result<Option<Arc<dyn bucketfs_auth::CredentialProvider>>> {
    let Ok(raw) = std::env::var("GATEWAY_CREDENTIALS") else {
        return Ok(None);
    };

    let mut triples = Vec::new();
    for entry in raw.split(',').filter(|s| !s.is_empty()) {
        let mut parts = entry.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(bucket), Some(akid), Some(secret))
                if !bucket.is_empty() && !akid.is_empty() && !secret.is_empty() =>
            {
                triples.push((bucket.to_owned(), akid.to_owned(), secret.to_owned()));
            }
            _ => anyhow::bail!("malformed GATEWAY_CREDENTIALS entry: {entry:?}"),
        }
    }

    if triples.is_empty() {
        return Ok(None);
    }

    info!(
        buckets = triples.len(),
        "configured credential provider from environment"
    );
    Ok(Some(Arc::new(StaticCredentialProvider::new(triples))))
}

/// Run the accept loop, serving connections until a shutdown signal is
/// received.
async fn serve<H: GatewayHandler>(
    listener: TcpListener,
    service: GatewayHttpService<H>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        data_dir = %config.data_dir,
        virtual_host_suffix = %config.virtual_host_suffix,
        virtual_hosting = config.virtual_hosting,
        skip_signature_validation = config.skip_signature_validation,
        version = VERSION,
        "starting bucketfs server",
    );

    let credential_provider = build_credential_provider()?;
    if !config.skip_signature_validation && credential_provider.is_none() {
        anyhow::bail!(
            "signature validation is enabled but GATEWAY_CREDENTIALS is not set; \
             set credentials or SKIP_SIGNATURE_VALIDATION=true"
        );
    }

    let http_config = build_http_config(&config, credential_provider);
    let gateway = Gateway::new(config.clone());
    let service = GatewayHttpService::new(FsHandler(gateway), http_config);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_http_config_from_gateway_config() {
        let config = GatewayConfig::builder().build();
        let http_config = build_http_config(&config, None);

        assert_eq!(http_config.virtual_host_suffix, config.virtual_host_suffix);
        assert_eq!(http_config.virtual_hosting, config.virtual_hosting);
        assert_eq!(
            http_config.skip_signature_validation,
            config.skip_signature_validation
        );
        assert_eq!(http_config.max_clock_skew_secs, config.max_clock_skew_secs);
        assert!(http_config.credential_provider.is_none());
    }
}
