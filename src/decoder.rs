use crate::{
    common::{Request, RequestIndices},
    errors::DecoderError,
};
use tracing::trace;

const CONTENT_LENGTH: &[u8] = b"Content-Length:";
const BAD_REQUEST_LINE: &str = "request line incomplete or absent";

/// Result of a single [`parse`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<'b> {
    /// Not enough bytes yet. Retry with a longer buffer.
    Incomplete,
    /// The buffer can never form a valid request.
    Malformed(DecoderError),
    /// `leftover` is the number of bytes after the request's body.
    Complete { request: Request<'b>, leftover: usize },
}

impl<'b> ParseOutcome<'b> {
    #[inline]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete)
    }
}

/// Parses one HTTP/1.x request from the start of `bytes`.
///
/// Every field of the returned request borrows from `bytes`. The scan always
/// restarts at offset zero, so calling this again with the same bytes yields
/// the same outcome.
pub fn parse(bytes: &[u8]) -> ParseOutcome<'_> {
    let mut indices = RequestIndices::default();
    match decode_request(bytes, &mut indices) {
        Ok(Some(parsed_len)) => ParseOutcome::Complete {
            request: indices.view(bytes, None),
            leftover: bytes.len() - parsed_len,
        },
        Ok(None) => ParseOutcome::Incomplete,
        Err(e) => ParseOutcome::Malformed(e),
    }
}

/// Decodes a request into `req` as offsets into `bytes`.
///
/// Returns `Ok(None)` when more bytes are needed and `Ok(Some(n))` with the
/// number of bytes the request occupies, body included.
pub(crate) fn decode_request(
    bytes: &[u8],
    req: &mut RequestIndices,
) -> Result<Option<usize>, DecoderError> {
    req.clear();

    let line_end = match find_crlf(bytes, 0) {
        Some(eol) => eol,
        None => {
            trace!(len = bytes.len(), "request line not terminated yet");
            return Ok(None);
        }
    };
    decode_request_line(&bytes[..line_end], req)?;

    let head_start = line_end + 2;
    let mut pos = head_start;
    let mut content_length = 0;

    loop {
        let eol = match find_crlf(bytes, pos) {
            Some(eol) => eol,
            None => {
                trace!(len = bytes.len(), "header block not terminated yet");
                return Ok(None);
            }
        };

        if eol == pos {
            let body_start = eol + 2;
            let available = bytes.len() - body_start;
            if available < content_length {
                trace!(
                    content_length = content_length,
                    available = available,
                    "partial body"
                );
                return Ok(None);
            }
            req.head = (head_start, pos);
            req.body = (body_start, body_start + content_length);
            req.parsed_len = body_start + content_length;
            return Ok(Some(req.parsed_len));
        }

        if let Some(value) = bytes[pos..eol].strip_prefix(CONTENT_LENGTH) {
            match parse_content_length(value) {
                Some(n) => content_length = n,
                None => trace!(value = ?value, "ignoring unparsable Content-Length"),
            }
        }

        pos = eol + 2;
    }
}

/// Splits `METHOD SP PATH[?QUERY] SP PROTOCOL`. `line` excludes the CRLF.
fn decode_request_line(line: &[u8], req: &mut RequestIndices) -> Result<(), DecoderError> {
    let sp1 = match line.iter().position(|&b| b == b' ') {
        Some(0) | None => return Err(DecoderError::Malformed(BAD_REQUEST_LINE)),
        Some(i) => i,
    };

    let target_start = sp1 + 1;
    let mut query_start = None;
    let mut sp2 = None;
    for (i, &b) in line.iter().enumerate().skip(target_start) {
        match b {
            b'?' if query_start.is_none() => query_start = Some(i),
            b' ' => {
                sp2 = Some(i);
                break;
            }
            _ => (),
        }
    }
    let sp2 = sp2.ok_or(DecoderError::Malformed(BAD_REQUEST_LINE))?;

    if sp2 + 1 == line.len() {
        return Err(DecoderError::Malformed(BAD_REQUEST_LINE));
    }

    req.method = (0, sp1);
    match query_start {
        Some(q) => {
            req.path = (target_start, q);
            req.query = (q + 1, sp2);
        }
        None => {
            req.path = (target_start, sp2);
            req.query = (sp2, sp2);
        }
    }
    req.protocol = (sp2 + 1, line.len());
    debug_assert!(req.is_parsed());

    trace!(
        method = ?&line[req.method.0..req.method.1],
        protocol = ?&line[req.protocol.0..req.protocol.1],
        "decoded request line"
    );
    Ok(())
}

fn parse_content_length(value: &[u8]) -> Option<usize> {
    std::str::from_utf8(value.trim_ascii()).ok()?.parse().ok()
}

#[inline]
fn find_crlf(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|p| from + p)
}
