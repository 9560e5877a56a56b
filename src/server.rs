use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::Instrument as _;

use crate::{
    config::Config,
    error::Error,
    listener,
    payload::Payloads,
    response::{Responder, WriteStrategy},
};

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Delay before the next accept after `failures` consecutive errors. Doubles
/// from 10ms up to 1s.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_MIN
        .saturating_mul(1 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::default();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let servers = Servers::bind(&config)?;
        tracing::info!(
            message = "Bound listeners.",
            chunked = %servers.chunked.local_addr(),
            bulk = %servers.bulk.local_addr()
        );
        servers.serve().await;
        Ok::<_, anyhow::Error>(())
    })
}

/// One listener answering every connection with the same [`Responder`].
pub struct PayloadServer {
    listener: TcpListener,
    addr: SocketAddr,
    responder: Responder,
}

impl PayloadServer {
    pub fn bind(addr: SocketAddr, responder: Responder) -> Result<Self, Error> {
        let listener = listener::bind(addr)?;
        let addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;
        Ok(Self {
            listener,
            addr,
            responder,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Accepts connections until the process is killed.
    pub async fn serve(self) {
        let span = tracing::info_span!("server", strategy = %self.responder.strategy(), addr = %self.addr);
        async move {
            tracing::info!(message = "Accepting requests.");
            let mut failures = 0u32;
            loop {
                let (stream, peer) = match self.listener.accept().await {
                    Ok(accepted) => {
                        failures = 0;
                        accepted
                    }
                    Err(source) => {
                        let error = Error::Accept {
                            addr: self.addr,
                            source,
                        };
                        failures = failures.saturating_add(1);
                        let backoff = accept_backoff(failures);
                        // Only the first error of a streak is worth a warning.
                        if failures == 1 {
                            tracing::warn!(message = "Accept failed", %error, ?backoff);
                        } else {
                            tracing::debug!(message = "Accept failed", %error, failures, ?backoff);
                        }
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                };
                tracing::debug!(message = "Accepted connection", %peer);

                let responder = self.responder.clone();
                let connection_span = tracing::debug_span!("connection", %peer);
                tokio::spawn(
                    async move {
                        let service = service_fn(move |request| {
                            let response = responder.respond(request);
                            async move { Ok::<_, Infallible>(response) }
                        });
                        if let Err(error) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            tracing::debug!(message = "Connection closed with error", %error);
                        }
                    }
                    .instrument(connection_span),
                );
            }
        }
        .instrument(span)
        .await
    }
}

/// The chunked and the bulk server, sharing one set of payloads.
pub struct Servers {
    pub chunked: PayloadServer,
    pub bulk: PayloadServer,
}

impl Servers {
    pub fn bind(config: &Config) -> Result<Self, Error> {
        let payloads = Arc::new(Payloads::from_config(config));
        tracing::info!(
            message = "Built payloads.",
            chunk = payloads.chunk.len(),
            writes = payloads.write_count,
            body = payloads.body_len()
        );

        let responder = |strategy| {
            Responder::new(strategy, payloads.clone())
                .declare_content_length(config.declare_content_length)
        };
        Ok(Self {
            chunked: PayloadServer::bind(config.chunked_addr(), responder(WriteStrategy::Chunked))?,
            bulk: PayloadServer::bind(config.bulk_addr(), responder(WriteStrategy::Bulk))?,
        })
    }

    pub async fn serve(self) {
        tokio::join!(self.chunked.serve(), self.bulk.serve());
    }
}
