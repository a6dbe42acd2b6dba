use cds::aformat;
use std::fmt;

/// Connection identifier used to correlate log records.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Id(pub(crate) u64);

impl Id {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(aformat!(32, "{:#x}", self.0)?.as_str())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(aformat!(32, "Id({:#x})", self.0)?.as_str())
    }
}

/// Hands out sequential ids. Owned by the single accept loop.
#[derive(Debug)]
pub(crate) struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    #[inline]
    pub(crate) const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    #[inline]
    pub(crate) fn next(&mut self) -> Id {
        let id = Id(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
