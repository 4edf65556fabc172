use clap::Parser;
use promptbrush::config::AppConfig;
use promptbrush::engine::{Engine, RemoteBackend};
use promptbrush::pipeline::Pipeline;
use promptbrush::server::{self, AppState};
use promptbrush::store::ArtifactStore;
use promptbrush::{capability, store};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "promptbrush")]
#[command(about = "Instruction-driven image editing web service")]
#[command(long_about = "\
Instruction-driven image editing web service

Upload an image, describe the edit in plain language, and get the edited
image back from an external diffusion engine. When the engine is down or an
edit fails, the service degrades gracefully: you get a resized copy of your
original instead of an error page.

Configuration layers, lowest priority first:
  built-in defaults  →  PROMPTBRUSH_* environment variables  →  these flags

Environment variables:
  PROMPTBRUSH_HOST          listen host           (default 0.0.0.0)
  PROMPTBRUSH_PORT          listen port           (default 5001)
  PROMPTBRUSH_DATA_DIR      artifact store root   (default data/)
  PROMPTBRUSH_ENGINE_URL    inference sidecar     (default http://127.0.0.1:5100)
  PROMPTBRUSH_SECRET        flash signing secret  (default: dev value, change it)

Artifacts are kept in two flat directories under the data dir: uploads/ for
raw uploads and output/ for produced results. Nothing is ever deleted by the
service; retention is yours to manage.")]
#[command(version = version_string())]
struct Cli {
    /// Listen host
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(long)]
    port: Option<u16>,

    /// Root directory for stored artifacts
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Base URL of the inference sidecar
    #[arg(long)]
    engine_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptbrush=info,tower_http=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env();
    if let Some(host) = cli.host {
        cfg.host = host;
    }
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(url) = cli.engine_url {
        cfg.engine_url = url;
    }
    cfg.validate()?;
    info!(settings = %serde_json::to_string(&cfg)?, "configuration loaded");

    if cfg.secret_is_default() {
        warn!("PROMPTBRUSH_SECRET is unset — using the development signing secret");
    }

    let report = capability::CapabilityReport::detect();
    let engine_cfg = capability::select(report);
    info!(
        selection = %serde_json::to_string(&engine_cfg)?,
        "selected engine configuration"
    );

    let backend = Arc::new(RemoteBackend::new(&cfg.engine_url));
    let engine = Arc::new(Engine::initialize(backend, &engine_cfg).await);

    let artifact_store = Arc::new(ArtifactStore::new(&cfg.data_dir)?);
    info!(
        uploads = %artifact_store.dir(store::ArtifactKind::Upload).display(),
        output = %artifact_store.dir(store::ArtifactKind::Result).display(),
        "artifact store ready"
    );

    let pipeline = Arc::new(Pipeline::new(
        artifact_store.clone(),
        engine,
        engine_cfg,
        cfg.max_upload_bytes,
    ));

    let state = AppState {
        pipeline,
        store: artifact_store,
        secret: Arc::new(cfg.secret.clone()),
    };

    server::serve(&cfg, state).await?;
    Ok(())
}
