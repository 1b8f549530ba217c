use clap::Parser;
use rtmp_ingest_server::config::{Args, ConnectionSettings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let listener = TcpListener::bind(args.listen).await?;
    rtmp_ingest_server::serve(listener, ConnectionSettings::from(&args)).await;

    Ok(())
}
