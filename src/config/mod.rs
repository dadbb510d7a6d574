// Config layer - environment-driven settings and process bootstrap
pub mod cache;
pub mod database;
pub mod env_provider;
pub mod logging;
pub mod settings;

pub use env_provider::{EnvironmentProvider, SystemEnvironment};
pub use logging::setup_tracing;
pub use settings::{ApplicationSettings, SettingsError};
