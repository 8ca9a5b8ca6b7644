pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::UploadError;
pub use state::AppState;
