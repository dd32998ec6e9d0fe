use clap::Parser;
use log::info;
use server::network::Server;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Maximum number of concurrent players
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// Seconds between a round ending and the coin/score reset
    #[arg(short, long, default_value = "5")]
    reset_delay: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    info!("starting server on {}", addr);

    let mut server = Server::new(
        &addr,
        args.max_clients,
        Duration::from_secs(args.reset_delay),
    )
    .await?;

    server.run().await?;

    Ok(())
}
