use crate::{
    common::{Request, RequestIndices, Status},
    decoder::decode_request,
    encoder::encode_response,
    errors::{ConnectionError, DecoderError},
    server::ServerCfg,
};
use bytes::{Buf, BytesMut};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, trace, warn};

pub(crate) const RBUF_CAP: usize = 8 * 1024;
pub(crate) const WBUF_CAP: usize = 512;

pub const ERROR_BODY: &[u8] = b"Internal Server Error\n";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PipelineState {
    AwaitingRequest,
    /// A complete request sits at the front of the read buffer.
    RequestReady,
    /// Input was unusable; the next step answers with a failure and closes.
    ErrorLatched,
    Closed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Step {
    /// Append more bytes to [`Pipeline::read_buf`] and advance again.
    NeedMore,
    /// A request was parsed. Apply any delay, then advance again to respond.
    Ready,
    /// Malformed input was latched. Advance again to emit the failure.
    Latched,
    /// [`Pipeline::output`] holds a full response.
    Write { close: bool },
    Closed,
}

type StepResult = Result<Step, ConnectionError>;

/// Per-connection request/response state machine.
///
/// Owns the connection's buffers and never touches a socket; the runtime
/// feeds bytes in through [`read_buf`](Self::read_buf) and transmits
/// [`output`](Self::output).
#[derive(Debug)]
pub struct Pipeline {
    cfg: Arc<ServerCfg>,
    state: PipelineState,
    rbuf: BytesMut,
    wbuf: BytesMut,
    req: RequestIndices,
    remote_addr: Option<SocketAddr>,
    msgs_cnt: usize,
}

impl Pipeline {
    pub fn new(cfg: Arc<ServerCfg>, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            cfg,
            state: PipelineState::AwaitingRequest,
            rbuf: BytesMut::with_capacity(RBUF_CAP),
            wbuf: BytesMut::with_capacity(WBUF_CAP),
            req: RequestIndices::default(),
            remote_addr,
            msgs_cnt: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[inline]
    pub fn cfg(&self) -> &ServerCfg {
        &self.cfg
    }

    /// Number of responses produced so far.
    #[inline]
    pub fn msgs_cnt(&self) -> usize {
        self.msgs_cnt
    }

    /// Buffer the runtime appends inbound bytes to.
    #[inline]
    pub fn read_buf(&mut self) -> &mut BytesMut {
        &mut self.rbuf
    }

    #[inline]
    pub fn buffered(&self) -> &[u8] {
        &self.rbuf
    }

    /// Bytes to transmit after a [`Step::Write`].
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.wbuf
    }

    /// The parsed request, available between [`Step::Ready`] and the next
    /// advance.
    pub fn request(&self) -> Option<Request<'_>> {
        if self.state == PipelineState::RequestReady {
            Some(self.req.view(&self.rbuf, self.remote_addr))
        } else {
            None
        }
    }

    pub fn advance(&mut self) -> StepResult {
        match self.state {
            PipelineState::AwaitingRequest => Ok(self.decode()),
            PipelineState::RequestReady => self.respond(),
            PipelineState::ErrorLatched => self.respond_error(),
            PipelineState::Closed => Ok(Step::Closed),
        }
    }

    fn decode(&mut self) -> Step {
        match decode_request(&self.rbuf, &mut self.req) {
            Ok(Some(parsed_len)) => {
                trace!(
                    parsed_len = parsed_len,
                    leftover = self.rbuf.len() - parsed_len,
                    "request ready"
                );
                self.state = PipelineState::RequestReady;
                Step::Ready
            }
            Ok(None) if self.rbuf.len() >= self.cfg.max_request_size => {
                self.latch(DecoderError::TooLarge(self.rbuf.len()))
            }
            Ok(None) => Step::NeedMore,
            Err(e) => self.latch(e),
        }
    }

    fn latch(&mut self, e: DecoderError) -> Step {
        warn!(err = %e, buffered = self.rbuf.len(), "latching connection error");
        self.req.clear();
        self.state = PipelineState::ErrorLatched;
        Step::Latched
    }

    fn respond(&mut self) -> StepResult {
        let body = match self.cfg.transform.apply() {
            Ok(body) => body,
            Err(e) => {
                error!(err = %e, mode = %self.cfg.transform.mode(), "transform failed");
                return self.respond_error();
            }
        };

        let close = !self.cfg.keep_alive;
        self.wbuf.clear();
        encode_response(&mut self.wbuf, Status::Ok, close, b"", &body)?;
        self.msgs_cnt += 1;

        if close {
            self.state = PipelineState::Closed;
        } else {
            // views into the consumed bytes die here
            self.rbuf.advance(self.req.parsed_len);
            self.req.clear();
            self.state = PipelineState::AwaitingRequest;
        }
        Ok(Step::Write { close })
    }

    fn respond_error(&mut self) -> StepResult {
        self.wbuf.clear();
        encode_response(&mut self.wbuf, Status::Error, true, b"", ERROR_BODY)?;
        self.msgs_cnt += 1;
        self.req.clear();
        self.rbuf.clear();
        self.state = PipelineState::Closed;
        Ok(Step::Write { close: true })
    }
}
