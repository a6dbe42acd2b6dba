//! Minimal HTTP/1.1 request/response engine: a zero-copy request parser, a
//! byte-exact response encoder, a payload transform and the per-connection
//! pipeline that ties them together on top of tokio.

pub(crate) mod common;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod header;
pub mod server;
pub mod transform;

pub use common::*;
pub use decoder::{parse, ParseOutcome};
