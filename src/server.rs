mod connection;
pub use connection::*;

mod config;
mod config_builder;
mod pipeline;
mod tcp_acceptor;
mod worker_pool;

pub use config::*;
pub use config_builder::*;
pub use pipeline::*;
pub use tcp_acceptor::*;
pub use worker_pool::*;
