use crate::header::{Header, HeaderName, HeaderValue};

/// Walks a raw header block line by line without copying.
///
/// Lines without a colon are skipped, the value is trimmed of surrounding
/// spaces and tabs.
#[derive(Debug, Clone)]
pub struct HeaderIterator<'b> {
    rest: &'b [u8],
}

impl<'b> HeaderIterator<'b> {
    #[inline]
    pub(crate) fn new(head: &'b [u8]) -> Self {
        Self { rest: head }
    }

    fn next_line(&mut self) -> Option<&'b [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        let rest = self.rest;
        match rest.windows(2).position(|w| w == b"\r\n") {
            Some(eol) => {
                self.rest = &rest[eol + 2..];
                Some(&rest[..eol])
            }
            None => {
                self.rest = &[];
                Some(rest)
            }
        }
    }
}

impl<'b> Iterator for HeaderIterator<'b> {
    type Item = Header<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.next_line() {
            let colon = match line.iter().position(|&b| b == b':') {
                Some(c) => c,
                None => continue,
            };
            return Some(Header {
                name: HeaderName::new(&line[..colon]),
                value: HeaderValue::new(trim_spht(&line[colon + 1..])),
            });
        }
        None
    }
}

fn trim_spht(mut v: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = v {
        v = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = v {
        v = rest;
    }
    v
}
