// Shared state handed to every request handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::ports::EventStore;
use crate::service::counts::CounterService;
use crate::service::events::EventService;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub counts: Arc<CounterService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, config: AppConfig) -> Self {
        Self {
            events: Arc::new(EventService::new(store.clone())),
            counts: Arc::new(CounterService::new(store)),
            config: Arc::new(config),
        }
    }

    /// The resource noun used in every envelope.
    pub fn resource(&self) -> &str {
        &self.config.resource
    }
}
