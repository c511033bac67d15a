use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("{message}")]
    Usage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("failed to load the extractor library: {}", path.display())]
    LoadLibrary {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("failed to resolve the extract function")]
    ResolveSymbol {
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("path contains an interior NUL byte: {}", path.display())]
    InvalidPath { path: PathBuf },

    #[error("failed to get current working directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("extract failed!")]
    ExtractionFailed { status: i32 },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ExtractorError {
    fn user_message(&self) -> String {
        match self {
            ExtractorError::ResolveSymbol { symbol, .. } => {
                format!("failed to resolve the extract function: {}", symbol)
            }
            ExtractorError::ExtractionFailed { status } => {
                format!("the extractor library returned status {}", status)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExtractorError::Usage { .. } => None,
            ExtractorError::Config { .. } => Some(
                "Check the syntax of dyld-extractor.toml and make sure library_path and entry_point are not empty.".to_string()
            ),
            ExtractorError::LoadLibrary { .. } => Some(
                "dsc_extractor.bundle ships with Xcode; pass its location with -l (e.g. -l $(xcode-select -p)/Platforms/iPhoneOS.platform/usr/lib/dsc_extractor.bundle).".to_string()
            ),
            ExtractorError::ResolveSymbol { .. } => Some(
                "The library at the given path does not look like dsc_extractor.bundle. Point -l at the bundle shipped with Xcode.".to_string()
            ),
            ExtractorError::ExtractionFailed { .. } => Some(
                "Make sure the cache file is a dyld shared cache matching the extractor library version, and that the destination is writable.".to_string()
            ),
            ExtractorError::CurrentDir(_) => Some(
                "Pass the destination explicitly with -d.".to_string()
            ),
            ExtractorError::InvalidPath { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ExtractorError {
    fn from(error: toml::de::Error) -> Self {
        ExtractorError::Config {
            message: error.to_string(),
        }
    }
}

impl ExtractorError {
    /// Process exit code for this error. Every failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
