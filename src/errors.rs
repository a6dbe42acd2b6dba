use std::{fmt, io};
use thiserror::Error;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecoderError {
    #[error("malformed request: {0}")]
    Malformed(&'static str),
    #[error("request too large: {0} bytes buffered")]
    TooLarge(usize),
}

/// Failure of the encrypt transform. Fatal to the current response only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    #[error("cipher setup failed: {0}")]
    Cipher(String),
    #[error("padding failed")]
    Padding,
    #[error("failed to generate IV: {0}")]
    Rng(#[from] rand::Error),
}

/// Ends the current connection, never the server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("fmt error: {0}")]
    Fmt(#[from] fmt::Error),
}
