pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig, UiConfig};
pub use loader::load_config;
