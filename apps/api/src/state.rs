use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::analysis::{FeedbackGenerator, RoleClassifier};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Built once at startup and shared read-only across requests.
    pub classifier: Arc<dyn RoleClassifier>,
    pub generator: Arc<dyn FeedbackGenerator>,
    /// One permit per analysis allowed in flight (`ANALYSIS_QUEUE_SIZE`).
    pub analysis_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        config: Config,
        classifier: Arc<dyn RoleClassifier>,
        generator: Arc<dyn FeedbackGenerator>,
    ) -> Self {
        let analysis_slots = Arc::new(Semaphore::new(config.analysis_queue_size));
        Self {
            config,
            classifier,
            generator,
            analysis_slots,
        }
    }
}
