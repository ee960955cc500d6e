// Counter service: the per-subject running tally.

use std::sync::Arc;

use crate::core::event::Counter;
use crate::core::ports::{EventStore, StoreError};

pub struct CounterService {
    store: Arc<dyn EventStore>,
}

impl CounterService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// `None` when the subject has never received an event.
    pub async fn get_count(&self, subject: &str) -> Result<Option<Counter>, StoreError> {
        self.store.get_counter(subject).await
    }
}
