pub mod config;
pub mod env;
pub mod error;
pub mod loader;

// Re-export commonly used types
pub use config::{ClientConfig, ClientConfigBuilder, API_PREFIX};
pub use env::apply_env_overrides;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, FileFormat};
