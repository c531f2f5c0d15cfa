use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::level::Severity;
use crate::telemetry::LoggerConfig;

/// Prefix shared by every logging environment variable.
pub const ENV_PREFIX: &str = "LOG_";

/// Logging settings read from `LOG_*` environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(rename = "redirectstdlog", default = "default_redirect_std_log")]
    pub redirect_std_log: bool,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(rename = "enablestacktrace", default)]
    pub enable_stack_trace: bool,
    #[serde(default)]
    pub encoding: Option<String>,
}

fn default_environment() -> String {
    "prod".to_string()
}

fn default_redirect_std_log() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            redirect_std_log: default_redirect_std_log(),
            level: None,
            enable_stack_trace: false,
            encoding: None,
        }
    }
}

/// Deployment tier selecting the base preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Qa,
    Prod,
}

impl Environment {
    /// Case-insensitive; anything other than `dev` or `qa` is production.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dev" => Environment::Dev,
            "qa" => Environment::Qa,
            _ => Environment::Prod,
        }
    }

    pub fn preset(&self) -> LoggerConfig {
        match self {
            Environment::Dev => LoggerConfig::development().with_encoding("console"),
            Environment::Qa => LoggerConfig::development().with_encoding("json"),
            Environment::Prod => LoggerConfig::production(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        // Parse LOG_* environment variables into the LoggingConfig struct
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    pub fn environment(&self) -> Environment {
        Environment::from_name(&self.environment)
    }

    /// Resolves the preset and applies the explicit overrides on top of it.
    pub fn to_logger_config(&self) -> LoggerConfig {
        let mut config = self.environment().preset();
        if let Some(encoding) = &self.encoding {
            config.encoding = encoding.clone();
        }
        config.disable_stacktrace = !self.enable_stack_trace;
        if let Some(level) = &self.level {
            config.level = Severity::parse_or_info(level);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{clear_log_env, set_env, TEST_LOCK};

    #[test]
    fn test_environment_mapping_is_case_insensitive() {
        assert_eq!(Environment::from_name("dev"), Environment::Dev);
        assert_eq!(Environment::from_name("DEV"), Environment::Dev);
        assert_eq!(Environment::from_name("Qa"), Environment::Qa);
        assert_eq!(Environment::from_name("prod"), Environment::Prod);
        assert_eq!(Environment::from_name(""), Environment::Prod);
        assert_eq!(Environment::from_name("staging"), Environment::Prod);
    }

    #[test]
    fn test_presets_per_environment() {
        for (name, development, encoding) in [
            ("prod", false, "json"),
            ("dev", true, "console"),
            ("qa", true, "json"),
            ("something-else", false, "json"),
        ] {
            let conf = LoggingConfig {
                environment: name.to_string(),
                ..Default::default()
            };
            let resolved = conf.to_logger_config();
            assert_eq!(resolved.development, development, "environment {name}");
            assert_eq!(resolved.encoding, encoding, "environment {name}");
        }
    }

    #[test]
    fn test_explicit_encoding_wins_over_every_preset() {
        for name in ["prod", "dev", "qa", "other"] {
            for encoding in ["json", "console"] {
                let conf = LoggingConfig {
                    environment: name.to_string(),
                    encoding: Some(encoding.to_string()),
                    ..Default::default()
                };
                assert_eq!(conf.to_logger_config().encoding, encoding);
            }
        }
    }

    #[test]
    fn test_stacktrace_suppression_is_inverse_of_enable() {
        let conf = LoggingConfig::default();
        assert!(conf.to_logger_config().disable_stacktrace);

        let conf = LoggingConfig {
            enable_stack_trace: true,
            ..Default::default()
        };
        assert!(!conf.to_logger_config().disable_stacktrace);
    }

    #[test]
    fn test_level_override_and_fallback() {
        let conf = LoggingConfig {
            environment: "dev".to_string(),
            level: Some("warn".to_string()),
            ..Default::default()
        };
        assert_eq!(conf.to_logger_config().level, Severity::Warn);

        let conf = LoggingConfig {
            environment: "dev".to_string(),
            level: Some("shouting".to_string()),
            ..Default::default()
        };
        assert_eq!(conf.to_logger_config().level, Severity::Info);

        // Unset keeps the preset's level
        let conf = LoggingConfig {
            environment: "dev".to_string(),
            ..Default::default()
        };
        assert_eq!(conf.to_logger_config().level, Severity::Debug);
    }

    #[test]
    fn test_from_env_defaults() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_log_env();

        let conf = LoggingConfig::from_env().unwrap();
        assert_eq!(conf, LoggingConfig::default());
    }

    #[test]
    fn test_from_env_reads_prefixed_keys() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_log_env();
        set_env("LOG_ENVIRONMENT", "QA");
        set_env("LOG_REDIRECTSTDLOG", "false");
        set_env("LOG_LEVEL", "error");
        set_env("LOG_ENABLESTACKTRACE", "true");
        set_env("LOG_ENCODING", "console");

        let conf = LoggingConfig::from_env().unwrap();
        clear_log_env();

        assert_eq!(conf.environment(), Environment::Qa);
        assert!(!conf.redirect_std_log);
        assert_eq!(conf.level.as_deref(), Some("error"));
        assert!(conf.enable_stack_trace);
        assert_eq!(conf.encoding.as_deref(), Some("console"));
    }

    #[test]
    fn test_from_env_rejects_malformed_bool() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_log_env();
        set_env("LOG_ENABLESTACKTRACE", "sometimes");

        let result = LoggingConfig::from_env();
        clear_log_env();

        assert!(result.is_err());
    }
}
