//! breedlog-api - livestock breed record service
//!
//! Serves classification, record review, breed catalog, profile and image
//! storage endpoints over HTTP.

use anyhow::{Context, Result};
use breedlog_api::classifier::{BreedClassifier, MockClassifier, RemoteClassifier};
use breedlog_api::config::{ClassifierSettings, Cli, ServiceConfig};
use breedlog_api::storage::LocalObjectStore;
use breedlog_api::{auth::JwtVerifier, build_router, AppState};
use breedlog_common::config::{database_path, load_toml_config, storage_path};
use breedlog_common::db::init_database;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting breedlog-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let toml_config = load_toml_config(cli.config.as_deref())?;
    let config = ServiceConfig::resolve(&cli, &toml_config)?;

    std::fs::create_dir_all(&config.root_folder).with_context(|| {
        format!("Failed to create root folder {}", config.root_folder.display())
    })?;
    info!("Root folder: {}", config.root_folder.display());

    let db_path = database_path(&config.root_folder);
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready at {}", db_path.display());
            pool
        }
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    let store_root = storage_path(&config.root_folder);
    info!("Object storage: {}", store_root.display());
    let store = Arc::new(LocalObjectStore::new(store_root));

    let classifier: Arc<dyn BreedClassifier> = match &config.classifier {
        ClassifierSettings::Mock { model_version } => {
            let mock = match model_version {
                Some(version) => MockClassifier::with_version(version.clone()),
                None => MockClassifier::new(),
            };
            Arc::new(mock)
        }
        ClassifierSettings::Remote {
            model_url,
            api_key,
            model_version,
        } => Arc::new(
            RemoteClassifier::new(model_url.clone(), api_key.clone(), model_version.clone())
                .context("Failed to build remote classifier client")?,
        ),
    };
    info!("Classifier: {}", classifier.model_version());

    let auth = Arc::new(JwtVerifier::new(
        &config.jwt_secret,
        config.jwt_audience.as_deref(),
    ));

    let state = AppState::new(pool, store, classifier, auth)
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("breedlog-api listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
