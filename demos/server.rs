use clap::Parser;
use std::{io::Result, net::SocketAddr, time::Duration};
use tracing_subscriber::EnvFilter;
use tsrv::{
    server::{ServerCfg, TcpAcceptor},
    transform::TransformMode,
};

#[derive(Debug, Parser)]
#[command(about = "HTTP/1.1 benchmark server")]
struct Args {
    /// server listen addr
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: SocketAddr,

    /// use HTTP Keep-Alive
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    keepalive: bool,

    /// sleep number of milliseconds per request
    #[arg(long, default_value_t = 0)]
    sleep: u64,

    /// encrypt response with aes-128-cbc
    #[arg(long, conflicts_with = "sha")]
    aes128: bool,

    /// output sha256 instead of plain response
    #[arg(long)]
    sha: bool,

    /// respond with this many 'a' characters instead of "Hello World!"
    #[arg(long, default_value_t = 0)]
    aaaa: usize,

    /// number of event loops, 0 for one per core
    #[arg(long, default_value_t = 0)]
    loops: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tsrv=info")),
        )
        .init();

    let args = Args::parse();
    let mode = if args.aes128 {
        TransformMode::Encrypt
    } else if args.sha {
        TransformMode::Digest
    } else {
        TransformMode::Passthrough
    };

    let cfg = ServerCfg::builder()
        .listen_addr(args.listen)
        .keep_alive(args.keepalive)
        .delay(Duration::from_millis(args.sleep))
        .mode(mode)
        .payload_size(args.aaaa)
        .workers(args.loops)
        .build();

    // the accept loop only needs one thread; connections run on the pool
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(async move {
        let acceptor = TcpAcceptor::bind(cfg).await?;
        acceptor.run().await
    })
}
