use std::net::{IpAddr, Ipv6Addr, SocketAddr};

pub const CHUNKED_PORT: u16 = 9000;
pub const BULK_PORT: u16 = 9001;
pub const REPEAT_COUNT: usize = 300;
pub const WRITE_COUNT: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// `::` listens dual-stack, on every IPv4 and IPv6 interface.
    pub host: IpAddr,
    pub chunked_port: u16,
    pub bulk_port: u16,
    /// Template copies per chunk unit.
    pub repeat_count: usize,
    /// Chunk units written per chunked response.
    pub write_count: usize,
    /// Send `content-length` instead of leaving the framing to hyper.
    pub declare_content_length: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            chunked_port: CHUNKED_PORT,
            bulk_port: BULK_PORT,
            repeat_count: REPEAT_COUNT,
            write_count: WRITE_COUNT,
            declare_content_length: false,
        }
    }
}

impl Config {
    pub fn chunked_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.chunked_port)
    }

    pub fn bulk_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.bulk_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_every_interface() {
        let config = Config::default();
        assert_eq!(
            config.chunked_addr(),
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 9000))
        );
        assert_eq!(
            config.bulk_addr(),
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 9001))
        );
    }
}
