use std::time::Duration;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::storage::FileStore;

#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub files: FileStore,
    pub upload_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
