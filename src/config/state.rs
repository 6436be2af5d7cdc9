// Application state module
// Bundles the configuration and the injected store client

use std::path::PathBuf;

use super::types::Config;
use crate::store::PersonStore;

/// Application state shared by every connection. The store client is
/// constructed here and owned for the life of the process; handlers
/// reach it through this state, never through a global.
pub struct AppState {
    pub config: Config,
    pub store: PersonStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let data_file = config
            .store
            .data_file
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Self {
            config,
            store: PersonStore::new(data_file),
        }
    }
}
