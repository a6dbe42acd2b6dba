/// Header name as it appears on the wire. Comparisons ignore ASCII case.
#[derive(Debug, Clone, Copy, Eq)]
pub struct HeaderName<'b>(&'b [u8]);

impl<'b> HeaderName<'b> {
    #[inline]
    pub(crate) fn new(name: &'b [u8]) -> Self {
        Self(name)
    }

    #[inline]
    pub fn as_bytes(&self) -> &'b [u8] {
        self.0
    }

    /// `None` when the name is not valid UTF-8.
    #[inline]
    pub fn to_str(&self) -> Option<&'b str> {
        std::str::from_utf8(self.0).ok()
    }
}

impl<'a, 'b> PartialEq<HeaderName<'a>> for HeaderName<'b> {
    #[inline]
    fn eq(&self, other: &HeaderName<'a>) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl<'a, 'b> PartialEq<&'a str> for HeaderName<'b> {
    #[inline]
    fn eq(&self, other: &&'a str) -> bool {
        self.0.eq_ignore_ascii_case(other.as_bytes())
    }
}

impl<'b> PartialEq<str> for HeaderName<'b> {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.as_bytes())
    }
}

impl<'a, 'b> PartialEq<&'a [u8]> for HeaderName<'b> {
    #[inline]
    fn eq(&self, other: &&'a [u8]) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_eq() {
        let name = HeaderName::new(b"Content-Length");

        assert_eq!(name, HeaderName::new(b"content-length"));
        assert_eq!(name, "content-LENGTH");
        assert_eq!(name, b"CONTENT-length".as_ref());
        assert_eq!(name.to_str(), Some("Content-Length"));
        assert_ne!(name, "Content-Type");
    }
}
