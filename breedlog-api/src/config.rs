//! Service configuration
//!
//! Each setting resolves CLI argument → `BREEDLOG_*` environment variable →
//! TOML file → compiled default. clap covers the first two tiers.

use breedlog_common::config::{resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};
use breedlog_common::{Error, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";

/// 8 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Command-line interface
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "breedlog-api", version, about = "Livestock breed record service")]
pub struct Cli {
    /// TOML config file (default: ~/.config/breedlog/config.toml)
    #[arg(long, env = "BREEDLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root folder holding the database and object storage
    #[arg(long)]
    pub root_folder: Option<String>,

    /// Listen address
    #[arg(long, env = "BREEDLOG_BIND")]
    pub bind: Option<String>,

    /// HS256 secret used to verify bearer tokens
    #[arg(long, env = "BREEDLOG_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Required `aud` claim, if any
    #[arg(long, env = "BREEDLOG_JWT_AUDIENCE")]
    pub jwt_audience: Option<String>,

    /// Classifier backend
    #[arg(long, env = "BREEDLOG_CLASSIFIER", value_enum)]
    pub classifier: Option<ClassifierBackend>,

    /// Remote inference endpoint
    #[arg(long, env = "BREEDLOG_MODEL_URL")]
    pub model_url: Option<String>,

    /// API key appended to remote inference requests
    #[arg(long, env = "BREEDLOG_MODEL_API_KEY", hide_env_values = true)]
    pub model_api_key: Option<String>,

    /// Model version label recorded with every prediction
    #[arg(long, env = "BREEDLOG_MODEL_VERSION")]
    pub model_version: Option<String>,

    /// Largest accepted image upload in bytes
    #[arg(long, env = "BREEDLOG_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClassifierBackend {
    Mock,
    Remote,
}

impl ClassifierBackend {
    /// Case-insensitive parse of the TOML `backend` value
    pub fn parse_name(name: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).map_err(|_| {
            Error::Config(format!(
                "classifier backend must be 'mock' or 'remote', got '{}'",
                name
            ))
        })
    }
}

/// Classifier selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierSettings {
    Mock {
        model_version: Option<String>,
    },
    Remote {
        model_url: String,
        api_key: Option<String>,
        model_version: String,
    },
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub classifier: ClassifierSettings,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    pub fn resolve(cli: &Cli, toml: &TomlConfig) -> Result<Self> {
        let root_folder = resolve_root_folder(cli.root_folder.as_deref(), ROOT_FOLDER_ENV, toml);

        let bind_addr = cli
            .bind
            .clone()
            .or_else(|| toml.bind_addr.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let jwt_secret = cli
            .jwt_secret
            .clone()
            .or_else(|| toml.jwt_secret.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "jwt_secret is required (--jwt-secret, BREEDLOG_JWT_SECRET or config.toml)"
                        .to_string(),
                )
            })?;

        let jwt_audience = cli.jwt_audience.clone().or_else(|| toml.jwt_audience.clone());

        let backend = match cli.classifier {
            Some(backend) => backend,
            None => match toml.classifier.backend.as_deref() {
                Some(name) => ClassifierBackend::parse_name(name)?,
                None => ClassifierBackend::Mock,
            },
        };

        let model_version = cli
            .model_version
            .clone()
            .or_else(|| toml.classifier.model_version.clone());

        let classifier = match backend {
            ClassifierBackend::Mock => ClassifierSettings::Mock { model_version },
            ClassifierBackend::Remote => {
                let model_url = cli
                    .model_url
                    .clone()
                    .or_else(|| toml.classifier.model_url.clone())
                    .ok_or_else(|| {
                        Error::Config("remote classifier needs a model_url".to_string())
                    })?;
                ClassifierSettings::Remote {
                    model_url,
                    api_key: cli
                        .model_api_key
                        .clone()
                        .or_else(|| toml.classifier.api_key.clone()),
                    model_version: model_version.unwrap_or_else(|| "remote".to_string()),
                }
            }
        };

        let max_upload_bytes = cli
            .max_upload_bytes
            .or(toml.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            root_folder,
            bind_addr,
            jwt_secret,
            jwt_audience,
            classifier,
            max_upload_bytes,
        })
    }
}
