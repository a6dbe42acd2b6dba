use crate::header::HeaderIterator;
use std::net::SocketAddr;

/// Byte offsets of a parsed request inside the connection read buffer.
///
/// The indices are only meaningful for the buffer they were decoded from and
/// must be cleared when that buffer is advanced.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub(crate) struct RequestIndices {
    pub(crate) method: (usize, usize),
    pub(crate) path: (usize, usize),
    pub(crate) query: (usize, usize),
    pub(crate) protocol: (usize, usize),
    pub(crate) head: (usize, usize),
    pub(crate) body: (usize, usize),
    pub(crate) parsed_len: usize,
}

impl RequestIndices {
    #[inline]
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub(crate) fn is_parsed(&self) -> bool {
        self.protocol.1 > self.protocol.0
    }

    pub(crate) fn view<'b>(&self, buf: &'b [u8], remote_addr: Option<SocketAddr>) -> Request<'b> {
        let slc = |(start, end): (usize, usize)| -> &'b [u8] { &buf[start..end] };
        Request {
            method: slc(self.method),
            path: slc(self.path),
            query: slc(self.query),
            protocol: slc(self.protocol),
            head: slc(self.head),
            body: slc(self.body),
            remote_addr,
        }
    }
}

/// A parsed HTTP request borrowing every field from the buffer it was parsed
/// from. Nothing is copied or unescaped.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Request<'b> {
    pub method: &'b [u8],
    /// Raw path, without the query.
    pub path: &'b [u8],
    /// Everything after the first `?`, empty when there is none.
    pub query: &'b [u8],
    pub protocol: &'b [u8],
    /// All header lines including their CRLFs, without the blank line.
    pub head: &'b [u8],
    /// Exactly `Content-Length` bytes, empty when no length was declared.
    pub body: &'b [u8],
    /// Supplied by the runtime, never derived from the bytes.
    pub remote_addr: Option<SocketAddr>,
}

impl<'b> Request<'b> {
    #[inline]
    pub fn headers(&self) -> HeaderIterator<'b> {
        HeaderIterator::new(self.head)
    }

    /// First header value whose name matches `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&'b [u8]> {
        self.headers()
            .find(|h| h.name == name)
            .map(|h| h.value.as_bytes())
    }
}
