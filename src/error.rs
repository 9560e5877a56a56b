use std::{io, net::SocketAddr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("Failed to accept on {addr}: {source}")]
    Accept { addr: SocketAddr, source: io::Error },
}
