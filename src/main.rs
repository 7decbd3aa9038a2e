use anyhow::Result;
use clap::{Arg, Command};
use std::sync::Arc;
use tracing::{info, warn};

use coursecast_rust::api::{start_http_server, AppContext};
use coursecast_rust::config::Config;
use coursecast_rust::content::ContentManager;
use coursecast_rust::llm::metadata::MetadataGenerator;
use coursecast_rust::player::VideoSourceResolver;
use coursecast_rust::state::AppState;
use coursecast_rust::storage::BucketStorage;
use coursecast_rust::store::RestStore;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("CourseCast")
        .version("0.1.0")
        .about("Video course catalog, player and content management backend")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Override the listen port"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "coursecast_rust=debug,info"
        } else {
            "coursecast_rust=info,warn"
        })
        .init();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse()?;
    }

    config.validate()?;

    info!("CourseCast backend starting...");
    info!("Store endpoint: {}", config.store.endpoint);
    info!("Storage bucket: {}", config.storage.bucket);

    let state = Arc::new(AppState::new());
    let store = Arc::new(RestStore::new(config.store.clone())?);
    let storage = Arc::new(BucketStorage::new(config.storage.clone())?);
    let content = Arc::new(ContentManager::new(
        store,
        storage,
        state.clone(),
        config.store.cascade_deletes,
    ));
    let metadata = Arc::new(MetadataGenerator::new(config.llm.clone()));

    // Initial catalog load runs in the background; the API reports the
    // loading state until it lands.
    let initial = content.clone();
    tokio::spawn(async move { initial.refresh_catalog().await });

    let context = AppContext {
        state,
        content,
        metadata,
        resolver: Arc::new(VideoSourceResolver::new()),
        storage_endpoint: config.storage.endpoint.clone(),
    };

    start_http_server(context, &config.server.host, config.server.port).await
}
