use crate::{
    common::Id,
    errors::ConnectionError,
    server::{Pipeline, ServerCfg, Step, RBUF_CAP},
};
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tracing::{debug, error, instrument, trace, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ProcessingDecision {
    Continue,
    Shutdown,
}

type ConnectionResult = Result<ProcessingDecision, ConnectionError>;

/// Drives one [`Pipeline`] over a TCP socket until either side closes.
#[derive(Debug)]
pub struct Connection {
    pub id: Id,
    peer: SocketAddr,
    sock: TcpStream,
    pipeline: Pipeline,
}

impl Connection {
    pub fn new(id: Id, sock: TcpStream, peer: SocketAddr, cfg: Arc<ServerCfg>) -> Self {
        Connection {
            id,
            peer,
            sock,
            pipeline: Pipeline::new(cfg, Some(peer)),
        }
    }

    #[instrument(name = "connection", skip(self), fields(id = %self.id, peer = %self.peer))]
    pub async fn process(&mut self) {
        if self.sock.set_nodelay(true).is_err() {
            error!("failed to set TCP_NODELAY");
        }

        loop {
            match self.process_message().await {
                Ok(ProcessingDecision::Continue) => (),
                Ok(ProcessingDecision::Shutdown) => break,
                Err(e) => {
                    error!(err = %e, "process_message exited with error");
                    break;
                }
            }
        }

        trace!(responses = self.pipeline.msgs_cnt(), "shutting down connection");
        if let Err(e) = self.sock.shutdown().await {
            warn!(err = %e, "socket.shutdown failed");
        }
    }

    /// Runs the pipeline until one response has been written.
    #[instrument(name = "message", skip(self), fields(n = self.pipeline.msgs_cnt() + 1), err)]
    async fn process_message(&mut self) -> ConnectionResult {
        loop {
            match self.pipeline.advance()? {
                Step::NeedMore => {
                    if self.recv().await? == 0 {
                        debug!(
                            buffered = self.pipeline.buffered().len(),
                            "incoming connection closed"
                        );
                        return Ok(ProcessingDecision::Shutdown);
                    }
                }
                Step::Ready => {
                    if let Some(req) = self.pipeline.request() {
                        debug!(
                            method = %String::from_utf8_lossy(req.method),
                            path = %String::from_utf8_lossy(req.path),
                            body = req.body.len(),
                            "request"
                        );
                    }
                    let delay = self.pipeline.cfg().delay();
                    if !delay.is_zero() {
                        // stalls the whole worker loop, including its other connections
                        thread::sleep(delay);
                    }
                }
                Step::Latched => trace!("error latched"),
                Step::Write { close } => {
                    self.sock.write_all(self.pipeline.output()).await?;
                    return Ok(if close {
                        ProcessingDecision::Shutdown
                    } else {
                        ProcessingDecision::Continue
                    });
                }
                Step::Closed => return Ok(ProcessingDecision::Shutdown),
            }
        }
    }

    async fn recv(&mut self) -> std::io::Result<usize> {
        let rbuf = self.pipeline.read_buf();
        if rbuf.capacity() - rbuf.len() < 1024 {
            rbuf.reserve(RBUF_CAP);
        }
        let n = self.sock.read_buf(rbuf).await?;
        trace!("received {} bytes", n);
        Ok(n)
    }
}
