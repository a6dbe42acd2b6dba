use crate::{
    common::Id,
    server::{Connection, ServerCfg},
};
use std::{
    io::{self, ErrorKind},
    net::SocketAddr,
    sync::Arc,
    thread,
};
use tokio::{net::TcpStream, runtime, sync::mpsc};
use tracing::{debug, error, info, trace, Instrument};

#[derive(Debug)]
struct Assignment {
    id: Id,
    sock: std::net::TcpStream,
    peer: SocketAddr,
}

#[derive(Debug)]
struct Worker {
    tx: mpsc::UnboundedSender<Assignment>,
    handle: thread::JoinHandle<()>,
}

/// Fixed set of event loops, each on its own thread with a private
/// current-thread runtime.
///
/// A connection is handed to exactly one loop and stays there; loops share
/// nothing but the read-only [`ServerCfg`].
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    next: usize,
}

impl WorkerPool {
    pub fn start(cfg: Arc<ServerCfg>) -> io::Result<Self> {
        let n = cfg.workers().max(1);
        let mut workers = Vec::with_capacity(n);
        for idx in 0..n {
            workers.push(spawn_worker(idx, cfg.clone())?);
        }
        info!(workers = n, "worker pool started");
        Ok(Self { workers, next: 0 })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Assigns `sock` to the next worker in round-robin order.
    pub fn dispatch(&mut self, id: Id, sock: std::net::TcpStream, peer: SocketAddr) -> io::Result<()> {
        let idx = self.next;
        self.next = (self.next + 1) % self.workers.len();
        trace!(id = %id, worker = idx, "dispatching connection");
        self.workers[idx]
            .tx
            .send(Assignment { id, sock, peer })
            .map_err(|_| io::Error::new(ErrorKind::BrokenPipe, "worker loop has exited"))
    }

    /// Stops handing out connections and waits for every loop to exit.
    /// Connections still open on a loop are dropped with its runtime.
    pub fn join(self) {
        for (idx, w) in self.workers.into_iter().enumerate() {
            drop(w.tx);
            if w.handle.join().is_err() {
                error!(worker = idx, "worker thread panicked");
            }
        }
    }
}

fn spawn_worker(idx: usize, cfg: Arc<ServerCfg>) -> io::Result<Worker> {
    let rt = runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = thread::Builder::new()
        .name(format!("tsrv-worker-{}", idx))
        .spawn(move || {
            rt.block_on(run_loop(rx, cfg).instrument(tracing::debug_span!("worker", idx)))
        })?;
    Ok(Worker { tx, handle })
}

async fn run_loop(mut rx: mpsc::UnboundedReceiver<Assignment>, cfg: Arc<ServerCfg>) {
    debug!("event loop started");
    while let Some(Assignment { id, sock, peer }) = rx.recv().await {
        let sock = match TcpStream::from_std(sock) {
            Ok(s) => s,
            Err(e) => {
                error!(id = %id, err = %e, "failed to register connection");
                continue;
            }
        };
        let cfg = cfg.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(id, sock, peer, cfg);
            conn.process().await;
            trace!(id = %conn.id, "connection terminated");
        });
    }
    debug!("event loop stopped");
}
