pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ui;

// Public API re-exports
pub use cli::Options;
pub use config::{CliOverrides, Config, ExtractorConfig, OutputConfig};
pub use error::{ExtractorError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{DynamicLoader, EntryPoint, ExtractionRequest, Extractor, LibraryLoader};
pub use ui::{ExtractionProgress, OutputFormatter, ProgressSink};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One run of the tool: parsed options, effective configuration and console.
pub struct DyldExtractor {
    options: Options,
    config: Config,
    output: OutputFormatter,
}

impl DyldExtractor {
    pub fn new(options: Options, config: Config, program: &str) -> Self {
        let output = OutputFormatter::new(program, options.verbose, config.output.colors);

        Self {
            options,
            config,
            output,
        }
    }

    /// Loads the configuration file (if any) and applies the command-line overrides.
    pub fn from_options(options: Options, program: &str) -> Result<Self> {
        let mut config = Config::load_with_defaults()?;
        config.merge_with_cli_args(&options.create_cli_overrides());
        config.validate()?;

        Ok(Self::new(options, config, program))
    }

    pub fn run(&self) -> Result<()> {
        self.run_with(&DynamicLoader::new())
    }

    pub fn run_with<L: LibraryLoader>(&self, loader: &L) -> Result<()> {
        let dest_path = resolve_destination(self.options.dest_path.as_deref(), std::env::current_dir)?;
        self.output.verbose(&format!(
            "extracted files will be in {}",
            dest_path.display()
        ));

        let request = self.extraction_request(dest_path);
        tracing::debug!(?request, "starting extraction");

        let extractor = Extractor::open(loader, &request, self.output.clone())?;

        let progress = Arc::new(ExtractionProgress::new(
            self.output.clone(),
            self.config.output.progress,
        ));
        let result = extractor.extract(progress.clone());
        let elapsed = progress.finish();
        self.output.verbose(&format!(
            "extractor finished in {}",
            ui::progress::format_duration(elapsed)
        ));

        result?;
        self.output.success("done, have fun!");
        Ok(())
    }

    pub fn extraction_request(&self, dest_path: PathBuf) -> ExtractionRequest {
        ExtractionRequest {
            input_path: self.options.input_path.clone(),
            dest_path,
            library_path: self.config.extractor.library_path.clone(),
            entry_point: self.config.extractor.entry_point.clone(),
        }
    }

    pub fn handle_error(&self, error: &ExtractorError) {
        self.output.print_user_friendly_error(error);
    }
}

/// The explicit destination verbatim, otherwise the working directory.
pub fn resolve_destination<F>(explicit: Option<&Path>, current_dir: F) -> Result<PathBuf>
where
    F: FnOnce() -> std::io::Result<PathBuf>,
{
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => current_dir().map_err(ExtractorError::CurrentDir),
    }
}
