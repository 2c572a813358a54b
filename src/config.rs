use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;

pub struct SqlshiftConfig {
    /// Path to the directory holding sqlshift's data
    pub data_dir: String,
}

const EMPTY_CONFIG: &str = r#"### sqlshift configuration file

### directory for the database managed by sqlshift
# data_dir = "~/.sqlshift"
"#;

impl Default for SqlshiftConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.sqlshift", home_dir),
        }
    }
}

impl SqlshiftConfig {
    /// Create and initialize a configuration
    ///
    /// By default `$HOME/.sqlshift/sqlshift.toml` is used; a missing file is
    /// created with a commented template. Environment variables prefixed
    /// with `SQLSHIFT_` override file settings, e.g. `SQLSHIFT_DATA_DIR`.
    pub fn new(path: &Option<String>) -> Result<SqlshiftConfig> {
        let mut builder = Config::builder();

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let sqlshift_dir = format!("{}/.sqlshift", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(sqlshift_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create sqlshift directory: {}", e))?;
                let p = format!("{}/sqlshift.toml", sqlshift_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("SQLSHIFT"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => {
                let path = Path::new(p);
                path.to_str()
                    .ok_or_else(|| anyhow!("Could not convert data_dir path to string"))?
                    .to_string()
            }
            None => {
                let dir = format!("{}/.sqlshift/", home_dir.as_str());
                std::fs::create_dir_all(dir.as_str())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                dir
            }
        };

        Ok(SqlshiftConfig { data_dir })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/sqlshift-data.sqlite3", data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SqlshiftConfig::default();
        assert!(config.data_dir.ends_with(".sqlshift"));
    }

    #[test]
    fn test_paths() {
        let config = SqlshiftConfig {
            data_dir: "/test/dir".to_string(),
        };

        assert_eq!(config.sqlite_path(), "/test/dir/sqlshift-data.sqlite3");
    }
}
