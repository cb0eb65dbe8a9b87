use std::sync::Arc;

use crate::config::Config;
use crate::site::Site;

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(site: Site, config: Config) -> Self {
        Self {
            site: Arc::new(site),
            config: Arc::new(config),
        }
    }
}
