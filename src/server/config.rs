use crate::{server::ServerCfgBuilder, transform::Transform};
use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};

pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8000));
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Startup configuration. Immutable once built and shared by every worker.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ServerCfg {
    pub(crate) listen_addr: SocketAddr,
    pub(crate) keep_alive: bool,
    pub(crate) delay: Duration,
    pub(crate) workers: usize,
    pub(crate) max_request_size: usize,
    pub(crate) transform: Transform,
}

impl ServerCfg {
    #[inline]
    pub fn builder() -> ServerCfgBuilder {
        ServerCfgBuilder::default()
    }

    #[inline]
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    #[inline]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Simulated backend latency applied before each transform.
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}
