//! Development/production build mode.
//!
//! The mode is chosen once per process from the `DEBUG` environment
//! variable and never changes afterwards.

use std::sync::OnceLock;

/// Environment variable that selects development mode when non-empty
pub const MODE_ENV_VAR: &str = "DEBUG";

static PROCESS_MODE: OnceLock<BuildMode> = OnceLock::new();

/// Build profile selecting source maps or minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unminified output with a source map
    Development,
    /// Minified output, no source map
    Production,
}

impl BuildMode {
    /// Read the mode from the environment.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(MODE_ENV_VAR).as_deref())
    }

    /// Interpret a raw `DEBUG` value: any non-empty value means development.
    pub fn from_env_value(value: Option<&std::ffi::OsStr>) -> Self {
        match value {
            Some(v) if !v.is_empty() => BuildMode::Development,
            _ => BuildMode::Production,
        }
    }

    /// Mode for this process, read from the environment on first use.
    pub fn current() -> Self {
        *PROCESS_MODE.get_or_init(Self::from_env)
    }

    pub fn is_development(self) -> bool {
        matches!(self, BuildMode::Development)
    }

    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildMode::Development => write!(f, "development"),
            BuildMode::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::ffi::OsStr;

    #[test]
    fn test_from_env_value() {
        assert_eq!(BuildMode::from_env_value(None), BuildMode::Production);
        assert_eq!(BuildMode::from_env_value(Some(OsStr::new(""))), BuildMode::Production);
        assert_eq!(BuildMode::from_env_value(Some(OsStr::new("1"))), BuildMode::Development);
        // Any non-empty value counts, including "0"
        assert_eq!(BuildMode::from_env_value(Some(OsStr::new("0"))), BuildMode::Development);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let previous = std::env::var_os(MODE_ENV_VAR);

        std::env::set_var(MODE_ENV_VAR, "true");
        assert_eq!(BuildMode::from_env(), BuildMode::Development);

        std::env::remove_var(MODE_ENV_VAR);
        assert_eq!(BuildMode::from_env(), BuildMode::Production);

        if let Some(value) = previous {
            std::env::set_var(MODE_ENV_VAR, value);
        }
    }

    #[test]
    fn test_current_is_stable() {
        assert_eq!(BuildMode::current(), BuildMode::current());
    }

    #[test]
    fn test_display() {
        assert_eq!(BuildMode::Development.to_string(), "development");
        assert_eq!(BuildMode::Production.to_string(), "production");
        assert!(BuildMode::Development.is_development());
        assert!(BuildMode::Production.is_production());
    }
}
