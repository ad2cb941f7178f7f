use crate::config::ClientConfig;
use crate::env::apply_env_overrides;
use crate::error::{ConfigError, ConfigResult};
use std::fs;
use std::path::Path;

/// Supported file formats for configuration
#[derive(Debug, Clone, PartialEq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }
}

/// Loads a [`ClientConfig`] from files and the process environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file; missing keys take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<ClientConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = FileFormat::from_path(path)?;

        tracing::debug!(path = %path.display(), ?format, "loading client configuration");
        Self::parse_content(&content, format)
    }

    /// Parse configuration content directly
    pub fn parse_content(content: &str, format: FileFormat) -> ConfigResult<ClientConfig> {
        let config: ClientConfig = match format {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Optional file, then `CTLAPI_*` environment overrides
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> ConfigResult<ClientConfig> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => ClientConfig::default(),
        };
        let config = apply_env_overrides(base, |name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path("client.yaml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("client.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("client.json").unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_path("client.toml"),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
        ));
        assert!(FileFormat::from_path("client").is_err());
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let yaml = r#"
hostname: 10.0.0.5
port: 8000
default_polling_interval_ms: 1000
"#;
        let config = ConfigLoader::parse_content(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(config.hostname, "10.0.0.5");
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_polling_interval_ms, 1000);
        assert_eq!(config.default_polling_timeout_ms, 3 * 60 * 60 * 1000);
        assert_eq!(config.context_path, None);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        let json = r#"{"hostname": "", "port": 8080}"#;
        assert!(matches!(
            ConfigLoader::parse_content(json, FileFormat::Json),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            ConfigLoader::parse_content("{not json", FileFormat::Json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"hostname": "cp.local", "port": 9000, "context_path": "zstack"}}"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.base_url(), "http://cp.local:9000");
        assert_eq!(config.api_prefix(), "/zstack/v1");
    }
}
