use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};

use tokio::net::TcpListener;

use crate::error::Error;

const BACKLOG: i32 = 1024;

/// Binds a non-blocking listener on `addr` and registers it with the current
/// tokio runtime. Must be called from within a runtime.
///
/// IPv6 sockets accept IPv4 connections as well. On hosts without IPv6, `::`
/// falls back to `0.0.0.0`.
pub fn bind(addr: SocketAddr) -> Result<TcpListener, Error> {
    bind_socket(addr).map_err(|source| Error::Bind { addr, source })
}

fn bind_socket(addr: SocketAddr) -> io::Result<TcpListener> {
    let (socket, addr) = match new_socket(addr) {
        Err(error) if addr.ip() == Ipv6Addr::UNSPECIFIED => {
            tracing::debug!(message = "No IPv6 socket, listening on IPv4 only", %error);
            let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), addr.port());
            (new_socket(addr)?, addr)
        }
        socket => (socket?, addr),
    };
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;
    TcpListener::from_std(socket.into())
}

fn new_socket(addr: SocketAddr) -> io::Result<socket2::Socket> {
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}
