use crate::{
    common::IdGenerator,
    server::{ServerCfg, WorkerPool},
};
use std::{io::Result, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, task, time};
use tracing::{debug, error, info, instrument, trace, warn};

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Accepts connections and hands each one to the worker pool.
#[derive(Debug)]
pub struct TcpAcceptor {
    sock: TcpListener,
    local_addr: SocketAddr,
    cfg: Arc<ServerCfg>,
}

impl TcpAcceptor {
    pub async fn bind(cfg: Arc<ServerCfg>) -> Result<Self> {
        let sock = TcpListener::bind(cfg.listen_addr()).await?;
        let local_addr = sock.local_addr()?;
        Ok(Self {
            sock,
            local_addr,
            cfg,
        })
    }

    /// Address actually bound, useful when listening on port zero.
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[instrument(name = "tcp_acceptor", skip(self), fields(addr = %self.local_addr))]
    pub async fn run(&self) -> Result<()> {
        let mut pool = WorkerPool::start(self.cfg.clone())?;
        info!(
            workers = pool.len(),
            keep_alive = self.cfg.keep_alive(),
            mode = %self.cfg.transform().mode(),
            delay_ms = self.cfg.delay().as_millis() as u64,
            "server started"
        );

        let res = self.accept_loop(&mut pool).await;
        trace!("accept loop stopped");
        if task::spawn_blocking(move || pool.join()).await.is_err() {
            error!("failed to join worker pool");
        }
        res
    }

    async fn accept_loop(&self, pool: &mut WorkerPool) -> Result<()> {
        let mut ids = IdGenerator::starting_at(1);
        loop {
            let (sock, peer) = match self.sock.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(err = %e, "failed to accept connection");
                    time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            let conn_id = ids.next();
            debug!(peer = %peer, id = %conn_id, "accepted new connection");

            let sock = match sock.into_std() {
                Ok(s) => s,
                Err(e) => {
                    warn!(id = %conn_id, err = %e, "failed to detach socket");
                    continue;
                }
            };
            pool.dispatch(conn_id, sock, peer)?;
        }
    }
}
