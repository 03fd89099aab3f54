/// Broadcast chat server binary
use anyhow::Result;
use clap::Parser;
use linechat_server::Server;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind to this addr
    #[arg(short, long, default_value = "0.0.0.0:3003")]
    addr: String,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let listener = TcpListener::bind(args.addr).await?;
    let server = Server::new(listener);
    info!("listening on {}", server.local_addr()?);
    server.run().await
}
