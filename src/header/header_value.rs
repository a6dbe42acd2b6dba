#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HeaderValue<'b> {
    /// Raw bytes, not required to be UTF-8
    value: &'b [u8],
}

impl<'b> HeaderValue<'b> {
    #[inline]
    pub(crate) fn new(value: &'b [u8]) -> Self {
        Self { value }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'b [u8] {
        self.value
    }
}
