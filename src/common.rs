mod id;
mod request;
mod status;

pub(crate) use id::IdGenerator;
pub use id::Id;
pub(crate) use request::RequestIndices;
pub use request::Request;
pub use status::*;
