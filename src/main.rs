//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use bill_split::adapters::ai::{MockAiAdapter, OpenAiAdapter};
use bill_split::adapters::persistence::LocalStorageJson;
use bill_split::adapters::ui::tui::TuiInputPort;
use bill_split::ports::{BillStorePort, ExtractionPort, InputPort};
use bill_split::shared::config::AppConfig;
use bill_split::usecases::{ExtractionService, SplitService};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    bill_split::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config could not be loaded, using defaults");
        AppConfig::default()
    });

    // --- Hand-off storage ---
    let storage_path = cfg.local_storage_path();
    let storage = LocalStorageJson::new(&storage_path);
    storage
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(path = %storage_path.display(), "local storage ready");
    let store: Arc<dyn BillStorePort> = Arc::new(storage);

    // --- AI extraction ---
    let ai_adapter: Arc<dyn ExtractionPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "AI extraction enabled with OpenAI adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key().unwrap_or_default(),
            cfg.ai_model_or_default(),
        ))
    } else {
        warn!("BILL_SPLIT_AI_API_KEY not set, using mock AI adapter");
        Arc::new(MockAiAdapter::new())
    };

    // --- Services ---
    let extraction_service = Arc::new(ExtractionService::new(
        ai_adapter,
        cfg.max_image_bytes_or_default(),
    ));
    let split_service = Arc::new(SplitService::new(store));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&extraction_service),
        Arc::clone(&split_service),
    ));

    // --- Run (main menu -> Parse / Split / Reset) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
