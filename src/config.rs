use crate::error::{ExtractorError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_LIBRARY_PATH: &str = "/usr/lib/dsc_extractor.bundle";
pub const DEFAULT_ENTRY_POINT: &str = "dyld_shared_cache_extract_dylibs_progress";

const DEFAULT_CONFIG_PATHS: &[&str] = &["dyld-extractor.toml", ".dyld-extractor.toml"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub library_path: PathBuf,
    pub entry_point: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub progress: bool,
    pub colors: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from(DEFAULT_LIBRARY_PATH),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress: true,
            colors: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| ExtractorError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| ExtractorError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Loads the first config file found in the working directory, or the defaults.
    pub fn load_with_defaults() -> Result<Self> {
        for default_path in DEFAULT_CONFIG_PATHS {
            if Path::new(default_path).exists() {
                tracing::debug!(path = default_path, "loading configuration file");
                return Self::load_from_file(default_path);
            }
        }

        Ok(Self::default())
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref library_path) = cli_args.library_path {
            self.extractor.library_path = library_path.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.extractor.library_path.as_os_str().is_empty() {
            return Err(ExtractorError::Config {
                message: "library_path must not be empty".to_string(),
            });
        }

        if self.extractor.entry_point.is_empty() {
            return Err(ExtractorError::Config {
                message: "entry_point must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub library_path: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library_path(mut self, library_path: Option<PathBuf>) -> Self {
        self.library_path = library_path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.extractor.library_path,
            PathBuf::from("/usr/lib/dsc_extractor.bundle")
        );
        assert_eq!(
            config.extractor.entry_point,
            "dyld_shared_cache_extract_dylibs_progress"
        );
        assert!(config.output.progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[extractor]").unwrap();
        writeln!(temp_file, "library_path = \"/opt/xcode/dsc_extractor.bundle\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.extractor.library_path,
            PathBuf::from("/opt/xcode/dsc_extractor.bundle")
        );
        assert_eq!(config.extractor.entry_point, DEFAULT_ENTRY_POINT);
        assert!(config.output.colors);
    }

    #[test]
    fn test_malformed_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[extractor").unwrap();

        let result = Config::load_from_file(temp_file.path());
        assert!(matches!(result, Err(ExtractorError::Config { .. })));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/nonexistent/dyld-extractor.toml");
        assert!(matches!(result, Err(ExtractorError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        config.merge_with_cli_args(&CliOverrides::new());
        assert_eq!(
            config.extractor.library_path,
            PathBuf::from(DEFAULT_LIBRARY_PATH)
        );

        let overrides = CliOverrides::new().with_library_path(Some(PathBuf::from("/tmp/lib.dylib")));
        config.merge_with_cli_args(&overrides);
        assert_eq!(config.extractor.library_path, PathBuf::from("/tmp/lib.dylib"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.extractor.entry_point.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.extractor.library_path = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
