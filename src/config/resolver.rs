use std::{
    env, fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::raw::RawConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file '{0}' not found.")]
    NotFound(String),

    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to get current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

pub fn get_config_path_cwd(config_arg: &Path) -> Result<PathBuf, ConfigError> {
    if config_arg.is_absolute() {
        Ok(config_arg.to_path_buf())
    } else {
        let cwd = env::current_dir().map_err(ConfigError::CurrentDir)?;
        Ok(cwd.join(config_arg))
    }
}

/// Resolves a fixture reference relative to the provided base directory.
pub fn resolve_path(reference: &str, base: &Path) -> PathBuf {
    let ref_path = Path::new(reference.trim());
    if ref_path.is_absolute() {
        ref_path.to_path_buf()
    } else {
        base.join(ref_path)
    }
}

pub fn load_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let display = path.display().to_string();
    let file_content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ConfigError::NotFound(display.clone())
        } else {
            ConfigError::Read {
                path: display.clone(),
                source: e,
            }
        }
    })?;
    serde_yaml::from_str(&file_content).map_err(|e| ConfigError::Parse {
        path: display,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn relative_reference_joins_base() {
        let base = Path::new("/srv/mock");
        assert_eq!(
            resolve_path("teams.json", base),
            PathBuf::from("/srv/mock/teams.json")
        );
        assert_eq!(
            resolve_path("/data/teams.json", base),
            PathBuf::from("/data/teams.json")
        );
    }

    #[test]
    fn missing_config_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_yaml_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "routes: [unterminated").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn loads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server_port: 9000\nroutes:\n  - method: GET\n    route: /a\n    response_file: a.json"
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.routes[0].route, "/a");
    }
}
