//! INI file configuration adapter.

use crate::domain::error::DashboardError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| DashboardError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, DashboardError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| DashboardError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// No file at all: every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key).filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[database]
url = postgresql://reader@localhost:5432/trades
pool_size = 8

[cache]
ttl_seconds = 60

[web]
listen = 0.0.0.0:8080
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("database", "url"),
            Some("postgresql://reader@localhost:5432/trades".to_string())
        );
        assert_eq!(adapter.get_int("database", "pool_size", 4), 8);
        assert_eq!(adapter.get_int("cache", "ttl_seconds", 300), 60);
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("0.0.0.0:8080".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_or_blank_key() {
        let adapter = FileConfigAdapter::from_string("[database]\nurl =\n").unwrap();
        assert_eq!(adapter.get_string("database", "url"), None);
        assert_eq!(adapter.get_string("database", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[cache]\n").unwrap();
        assert_eq!(adapter.get_int("cache", "ttl_seconds", 300), 300);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[database]\npool_size = many\n").unwrap();
        assert_eq!(adapter.get_int("database", "pool_size", 4), 4);
    }

    #[test]
    fn get_double_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string("[cache]\nttl_seconds = 12.5\n").unwrap();
        assert_eq!(adapter.get_double("cache", "ttl_seconds", 0.0), 12.5);
        assert_eq!(adapter.get_double("cache", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_bool_parses_common_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[web]\na = true\nb = no\nc = 1\nd = maybe\n").unwrap();
        assert!(adapter.get_bool("web", "a", false));
        assert!(!adapter.get_bool("web", "b", true));
        assert!(adapter.get_bool("web", "c", false));
        assert!(adapter.get_bool("web", "d", true));
    }

    #[test]
    fn empty_adapter_yields_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("database", "url"), None);
        assert_eq!(adapter.get_int("database", "pool_size", 4), 4);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[web]\nstatic_dir = /srv/static\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("web", "static_dir"),
            Some("/srv/static".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, DashboardError::ConfigParse { .. }));
    }
}
