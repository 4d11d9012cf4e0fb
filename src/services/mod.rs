//! Business logic services

pub mod auth;
pub mod fines;
pub mod loans;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppError, repository::CirculationStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn CirculationStore>,
    pub loans: loans::LoansService,
    pub fines: fines::FinesService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Arc<dyn CirculationStore>, config: &AppConfig) -> Self {
        Self {
            loans: loans::LoansService::new(store.clone(), &config.fines, &config.loans),
            fines: fines::FinesService::new(store.clone(), &config.fines),
            stats: stats::StatsService::new(store.clone()),
            store,
        }
    }
}

/// Log internal failures of an operation with the entity it was working on
pub(crate) fn log_internal(operation: &'static str, entity_id: i32) -> impl FnOnce(&AppError) {
    move |e| {
        if e.is_internal() {
            tracing::error!(operation, entity_id, error = %e, "Operation failed");
        }
    }
}

/// Same as [`log_internal`] for operations that span many entities
pub(crate) fn log_internal_all(operation: &'static str) -> impl FnOnce(&AppError) {
    move |e| {
        if e.is_internal() {
            tracing::error!(operation, error = %e, "Operation failed");
        }
    }
}
