use crate::{
    server::{ServerCfg, DEFAULT_LISTEN_ADDR, DEFAULT_MAX_REQUEST_SIZE},
    transform::{Transform, TransformMode, DEFAULT_KEY, DEFAULT_PAYLOAD},
};
use bytes::Bytes;
use std::{net::SocketAddr, sync::Arc, thread, time::Duration};

#[derive(Debug)]
#[non_exhaustive]
pub struct ServerCfgBuilder {
    listen_addr: Option<SocketAddr>,
    keep_alive: bool,
    delay: Duration,
    workers: Option<usize>,
    max_request_size: usize,
    mode: TransformMode,
    payload: Bytes,
    key: [u8; 16],
}

impl Default for ServerCfgBuilder {
    fn default() -> Self {
        Self {
            listen_addr: None,
            keep_alive: true,
            delay: Duration::ZERO,
            workers: None,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            mode: TransformMode::default(),
            payload: Bytes::from_static(DEFAULT_PAYLOAD),
            key: DEFAULT_KEY,
        }
    }
}

impl ServerCfgBuilder {
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = Some(addr);
        self
    }

    pub fn keep_alive(mut self, on: bool) -> Self {
        self.keep_alive = on;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of worker loops; zero means one per available core.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = (n > 0).then_some(n);
        self
    }

    pub fn max_request_size(mut self, n: usize) -> Self {
        self.max_request_size = n;
        self
    }

    pub fn mode(mut self, mode: TransformMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Payload of `n` `a` characters. Zero keeps the current payload.
    pub fn payload_size(mut self, n: usize) -> Self {
        if n > 0 {
            self.payload = Bytes::from(vec![b'a'; n]);
        }
        self
    }

    pub fn key(mut self, key: [u8; 16]) -> Self {
        self.key = key;
        self
    }

    pub fn build(self) -> Arc<ServerCfg> {
        let workers = self
            .workers
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()));
        Arc::new(ServerCfg {
            listen_addr: self.listen_addr.unwrap_or(DEFAULT_LISTEN_ADDR),
            keep_alive: self.keep_alive,
            delay: self.delay,
            workers,
            max_request_size: self.max_request_size,
            transform: Transform::new(self.mode, self.payload, self.key),
        })
    }
}
