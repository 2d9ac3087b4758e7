use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "root/configs/app.yaml";

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Load config from file path, then apply environment overrides and validate.
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(content) => self.parse_config(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Config::default()
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                )))
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from YAML string
    pub fn parse_config(&self, content: &str) -> Result<Config> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse YAML config: {}", e)))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, LogOutput};

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let yaml = r#"
process:
  exe_path: /usr/local/bin/caller
  port: 22000
logging:
  level: info
  output: both
"#;
        let config = Parser::new().parse_config(yaml).unwrap();
        assert_eq!(config.process.port, 22000);
        assert_eq!(config.process.args, "--port=%d");
        assert_eq!(config.process.start_retry, 3);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.output, LogOutput::Both);
    }

    #[test]
    fn test_parse_retry_settings() {
        let yaml = r#"
process:
  start_retry: 5
  retry_delay_ms: 250
  stop_timeout: 2s
"#;
        let config = Parser::new().parse_config(yaml).unwrap();
        assert_eq!(config.process.start_retry, 5);
        assert_eq!(config.process.retry_delay(), std::time::Duration::from_millis(250));
        assert_eq!(
            config.process.stop_timeout().unwrap(),
            std::time::Duration::from_secs(2)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_level() {
        let yaml = "logging:\n  level: chatty\n";
        assert!(matches!(
            Parser::new().parse_config(yaml),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Parser::new().parse_config("\n").unwrap(), Config::default());
    }
}
