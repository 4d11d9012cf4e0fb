//! Biblioteca Library Back Office
//!
//! REST JSON API for the circulation desk: checkouts, returns, late-return
//! fines and fine payments.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use crate::config::AppConfig;
pub use crate::error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub verifier: Arc<dyn services::auth::CallerVerifier>,
}
