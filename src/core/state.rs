use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;

/// Shared application state handed to every handler. Cloning is an `Arc`
/// bump.
#[derive(Clone)]
pub(crate) struct AppState {
    shared: Arc<Shared>,
}

struct Shared {
    settings: Settings,
    db: PgPool,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        Self { shared: Arc::new(Shared { settings, db }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.shared.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.shared.db
    }
}
