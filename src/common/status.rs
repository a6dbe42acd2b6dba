use std::fmt::{Display, Formatter};

static STATUS_LINE: [&str; 2] = ["200 OK", "500 Error"];

/// The only two statuses the server ever answers with.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Default)]
pub enum Status {
    #[default]
    Ok = 0,
    Error = 1,
}

impl Status {
    #[inline]
    pub fn as_str(self) -> &'static str {
        STATUS_LINE[self as usize]
    }
}

impl Display for Status {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
