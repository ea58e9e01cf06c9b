use clap::Parser;
use std::sync::Arc;
use tracing::info;
use vermeer_cache::DerivativePipeline;
use vermeer_processor::ProcessorRegistry;
use vermeer_server::{AppState, ServerConfig, Uploader, create_router};
use vermeer_storage::{AssetCatalog, BlobStorage, FileSystemStorage, InMemoryCatalog};

#[derive(Parser, Debug)]
#[command(author, version, about = "Vermeer media server", long_about = None)]
struct Args {
    /// Address to bind (overrides VERMEER_BIND_ADDR)
    #[arg(short, long)]
    bind: Option<String>,

    /// Root directory for blob storage (overrides VERMEER_MEDIA_ROOT)
    #[arg(short, long)]
    media_root: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = args.media_root {
        config.media_root = root;
    }

    info!(
        bind_addr = %config.bind_addr,
        media_root = %config.media_root,
        resize_mode = %config.resize_mode,
        "Starting Vermeer media server"
    );

    let storage: Arc<dyn BlobStorage> = Arc::new(FileSystemStorage::new(&config.media_root)?);
    let catalog: Arc<dyn AssetCatalog> = Arc::new(InMemoryCatalog::new());
    let registry = Arc::new(ProcessorRegistry::with_defaults());

    let pipeline = Arc::new(
        DerivativePipeline::new(Arc::clone(&storage), Arc::clone(&catalog), registry)
            .with_mode(config.resize_mode)
            .with_transform_timeout(config.transform_timeout),
    );
    let uploader = Arc::new(Uploader::new(
        Arc::clone(&storage),
        Arc::clone(&catalog),
        config.allowed_extensions.clone(),
    ));

    let state = AppState::new(uploader, pipeline, config.upload_token.clone());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, router).await?;

    Ok(())
}
