pub mod app;
pub mod cloud;
pub mod config;
pub mod handlers;
pub mod metrics;

pub use app::AppState;
