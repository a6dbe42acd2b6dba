use crate::common::Status;
use bytes::BytesMut;
use httpdate::HttpDate;
use std::{fmt::Write, time::SystemTime};

pub const SERVER_IDENTITY: &str = "tsrv";

/// Appends a complete HTTP/1.1 response to `wbuf`, stamped with the current
/// time.
///
/// `head` is a series of raw header lines, each ending with CRLF, or empty.
/// `close` adds `Connection: close`.
#[inline]
pub fn encode_response(
    wbuf: &mut BytesMut,
    status: Status,
    close: bool,
    head: &[u8],
    body: &[u8],
) -> std::fmt::Result {
    encode_response_at(wbuf, SystemTime::now(), status, close, head, body)
}

pub fn encode_response_at(
    wbuf: &mut BytesMut,
    now: SystemTime,
    status: Status,
    close: bool,
    head: &[u8],
    body: &[u8],
) -> std::fmt::Result {
    write!(wbuf, "HTTP/1.1 {}\r\n", status)?;
    write!(wbuf, "Server: {}\r\n", SERVER_IDENTITY)?;
    if close {
        wbuf.extend_from_slice(b"Connection: close\r\n");
    }
    write!(wbuf, "Date: {}\r\n", HttpDate::from(now))?;
    if !body.is_empty() {
        wbuf.extend_from_slice(b"Content-Type: text/plain\r\n");
        write!(wbuf, "Content-Length: {}\r\n", body.len())?;
    }
    wbuf.extend_from_slice(head);
    wbuf.extend_from_slice(b"\r\n");
    wbuf.extend_from_slice(body);
    Ok(())
}
