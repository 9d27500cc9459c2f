use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::affordability::AffordabilityService;
use crate::config::RegulatorySettings;
use crate::error::AppError;
use crate::regulatory::{ConfiguredProvider, RegulatoryConfigCache};

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
}

pub type ConfiguredService = AffordabilityService<ConfiguredProvider>;

/// Loads regulatory parameters per the settings and wraps them in a service.
pub fn build_service(settings: &RegulatorySettings) -> Result<Arc<ConfiguredService>, AppError> {
    let provider = ConfiguredProvider::from_path(settings.config_path.clone());
    let cache = RegulatoryConfigCache::load(provider, settings.freshness(), Utc::now())?;
    Ok(Arc::new(AffordabilityService::new(Arc::new(cache))))
}
