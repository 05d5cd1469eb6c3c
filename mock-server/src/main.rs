use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// In-memory todo backend for local development and tests.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// HS256 secret used to sign access tokens.
    #[arg(long, env = "TOKEN_SECRET", default_value = "mock-server-development-secret")]
    token_secret: String,

    /// Access token lifetime in minutes.
    #[arg(long, env = "TOKEN_TTL_MINUTES", default_value_t = 30)]
    token_ttl_minutes: i64,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = mock_server::Config {
        secret: args.token_secret,
        token_ttl: chrono::Duration::minutes(args.token_ttl_minutes),
    };

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    mock_server::run_with(listener, config).await
}
