pub mod cache;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod export;
pub mod format;
pub mod gallery;
pub mod handlers;
pub mod images;
pub mod logging;
pub mod models;
pub mod revalidate;
pub mod schema;
pub mod server;
pub mod site;
pub mod state;
pub mod views;
