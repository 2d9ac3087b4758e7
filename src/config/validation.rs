use super::{Config, LogLevel};
use crate::error::{Error, Result};

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.process.port == 0 {
            return Err(Error::Validation(
                "invalid port: must be between 1 and 65535".to_string(),
            ));
        }

        if self.process.exe_path.as_os_str().is_empty() {
            return Err(Error::Validation(
                "executable path cannot be empty".to_string(),
            ));
        }

        if self.process.start_retry == 0 {
            return Err(Error::Validation(
                "start_retry must be at least 1".to_string(),
            ));
        }

        self.process.stop_timeout()?;

        if self.storage.path.as_os_str().is_empty() {
            return Err(Error::Validation("storage path cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Apply `CALLER_PORT`, `CALLER_EXE_PATH` and `LOG_LEVEL` overrides.
    ///
    /// An unparseable port is ignored; an unknown log level is rejected.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CALLER_PORT").filter(|v| !v.is_empty()) {
            match v.trim().parse::<u16>() {
                Ok(port) => self.process.port = port,
                Err(_) => tracing::warn!("Ignoring unparseable CALLER_PORT '{}'", v),
            }
        }

        if let Some(v) = lookup("CALLER_EXE_PATH").filter(|v| !v.is_empty()) {
            self.process.exe_path = v.into();
        }

        if let Some(v) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.logging.level = LogLevel::parse(&v).ok_or_else(|| {
                Error::Validation(format!(
                    "invalid log level '{}': must be debug, info, warn, error, or fatal",
                    v
                ))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_port_and_empty_exe() {
        let mut config = Config::default();
        config.process.port = 0;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));

        let mut config = Config::default();
        config.process.exe_path = "".into();
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_zero_retries_and_bad_stop_timeout() {
        let mut config = Config::default();
        config.process.start_retry = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.process.stop_timeout = "eventually".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_replace_values() {
        let mut config = Config::default();
        config
            .apply_overrides_from(lookup(&[
                ("CALLER_PORT", "30001"),
                ("CALLER_EXE_PATH", "/opt/caller/bin"),
                ("LOG_LEVEL", "ERROR"),
            ]))
            .unwrap();

        assert_eq!(config.process.port, 30001);
        assert_eq!(config.process.exe_path, std::path::PathBuf::from("/opt/caller/bin"));
        assert_eq!(config.logging.level, LogLevel::Error);
    }

    #[test]
    fn unparseable_port_override_is_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides_from(lookup(&[("CALLER_PORT", "not-a-port")]))
            .unwrap();
        assert_eq!(config.process.port, crate::config::DEFAULT_PORT);
    }

    #[test]
    fn unknown_log_level_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides_from(lookup(&[("LOG_LEVEL", "chatty")]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
