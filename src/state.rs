// Application state shared by every connection

use crate::config::Config;

/// Immutable per-process state: configuration plus the injected object store
pub struct AppState<S> {
    pub config: Config,
    pub store: S,
}

impl<S> AppState<S> {
    pub const fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }
}
