use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storygen::{api, config::Config, state::AppState};

#[derive(Parser)]
#[command(name = "storygen")]
#[command(about = "Feature-to-story-to-test generation server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the storygen server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "storygen=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let config = Config::from_env();
    tracing::info!(config = %config.summary(), "loaded configuration");
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; generation will use the baseline engine");
    }

    let state = AppState::new(config);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    tracing::info!("storygen server listening on http://127.0.0.1:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await,
        // Default: start server on the default port
        None => serve(8000).await,
    }
}
