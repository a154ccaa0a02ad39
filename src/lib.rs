pub mod config;
pub mod db;
pub mod ingest;

/// Application name for XDG paths
pub const APP_NAME: &str = "trackmeta";
