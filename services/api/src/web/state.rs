//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use campify_core::ports::{EntityStore, ReportTextService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<Config>,
    pub report_text: Arc<dyn ReportTextService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        config: Arc<Config>,
        report_text: Arc<dyn ReportTextService>,
    ) -> Self {
        Self {
            store,
            config,
            report_text,
        }
    }
}
