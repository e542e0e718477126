use std::sync::Arc;
use std::time::Duration;

use crate::broker::Broker;
use crate::config::Config;

/// The application's shared state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub broker: Arc<Broker>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let typing_expiry = Duration::from_secs(config.typing_expiry_secs);
        Self {
            config: Arc::new(config),
            broker: Arc::new(Broker::new(typing_expiry)),
        }
    }
}
