use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emotion_canvas::ai::OpenAiClient;
use emotion_canvas::api;
use emotion_canvas::config::Config;
use emotion_canvas::db::{MemorySessionStore, SessionStore, SqliteSessionStore};

#[derive(Parser)]
#[command(name = "emotion-canvas")]
#[command(about = "Guided emotional-expression sessions with visual metaphor images")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port for HTTP
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Where session state is kept
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    /// SQLite database file (defaults to the user data directory)
    #[arg(long)]
    db_path: Option<PathBuf>,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            store: StoreKind::Memory,
            db_path: None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreKind {
    Memory,
    Sqlite,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "emotion_canvas=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_store(args: &ServeArgs) -> anyhow::Result<Arc<dyn SessionStore>> {
    match args.store {
        StoreKind::Memory => Ok(Arc::new(MemorySessionStore::new())),
        StoreKind::Sqlite => {
            let store = match &args.db_path {
                Some(path) => SqliteSessionStore::open(path.clone())?,
                None => SqliteSessionStore::open_default()?,
            };
            store.migrate()?;
            Ok(Arc::new(store))
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::from_env();
    if config.ephemeral_secret {
        tracing::warn!(
            "EMOTION_CANVAS_SESSION_SECRET is not set; sessions will not survive a restart"
        );
    }
    if config.provider.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; provider calls will be rejected");
    }

    let client = Arc::new(OpenAiClient::from_config(&config.provider)?);
    let store = open_store(&args)?;
    let state = api::AppState::new(&config, store, client.clone(), client)?;
    let app = api::create_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Emotion Canvas listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::default()).await,
    }
}
