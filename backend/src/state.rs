//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Create expensive resources once**: the DB pool and the metrics
//!    handle are built at startup
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::config::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use nutrition_coach_shared::NutritionSettings;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// # Performance
///
/// - `db`: PgPool is internally Arc'd, cloning is O(1)
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `metrics`: PrometheusHandle is internally Arc'd
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Renders the Prometheus exposition; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: PgPool, config: AppConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            metrics,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Engine settings
    #[inline]
    pub fn nutrition(&self) -> &NutritionSettings {
        &self.config.nutrition
    }
}
