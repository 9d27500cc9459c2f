use std::path::PathBuf;

use super::loader::load_config_from_path;
use super::{RegulatoryConfig, RegulatoryConfigError};

/// Source of regulatory parameters. Implementations may be slow; callers cache the result.
pub trait RegulatoryConfigProvider: Send + Sync {
    fn fetch(&self) -> Result<RegulatoryConfig, ProviderError>;
    fn describe(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Invalid(#[from] RegulatoryConfigError),
    #[error("regulatory provider unavailable: {0}")]
    Unavailable(String),
}

/// Serves the built-in parameters from [`super::standard`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConfigProvider;

impl RegulatoryConfigProvider for StandardConfigProvider {
    fn fetch(&self) -> Result<RegulatoryConfig, ProviderError> {
        Ok(RegulatoryConfig::standard()?)
    }

    fn describe(&self) -> String {
        "built-in standard parameters".to_string()
    }
}

/// Re-reads a JSON document (and its CSV schedules) from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegulatoryConfigProvider for FileConfigProvider {
    fn fetch(&self) -> Result<RegulatoryConfig, ProviderError> {
        Ok(load_config_from_path(&self.path)?)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Provider selected from application settings.
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    Standard(StandardConfigProvider),
    File(FileConfigProvider),
}

impl ConfiguredProvider {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(FileConfigProvider::new(path)),
            None => Self::Standard(StandardConfigProvider),
        }
    }
}

impl RegulatoryConfigProvider for ConfiguredProvider {
    fn fetch(&self) -> Result<RegulatoryConfig, ProviderError> {
        match self {
            Self::Standard(provider) => provider.fetch(),
            Self::File(provider) => provider.fetch(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Standard(provider) => provider.describe(),
            Self::File(provider) => provider.describe(),
        }
    }
}
